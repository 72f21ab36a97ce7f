// Kettle domain model

#[derive(Debug, Clone)]
pub struct Kettle {
    pub id: String,
    pub name: String,
}

impl Kettle {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "stagg_ekg_pro_" to "stagg ekg pro"
        id.trim_end_matches('_').replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name() {
        let kettle = Kettle::new("stagg_ekg_pro_".to_string());
        assert_eq!(kettle.name, "stagg ekg pro");

        let kettle = Kettle::new("Kitchen_Kettle".to_string());
        assert_eq!(kettle.name, "Kitchen Kettle");
    }
}
