// Kettle HTTP CLI client. The kettle speaks a flat command protocol over
// GET: one `cmd` query parameter, space-delimited arguments, free-text
// key=value responses.
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum CliError {
    #[error("a kettle base URL is required")]
    MissingBaseUrl,
    #[error("kettle CLI request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("kettle CLI returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Readings from the `pwmprt` PID telemetry command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PwmReport {
    pub tempr: Option<f64>,
    pub setp: Option<f64>,
    pub out: Option<f64>,
    pub err: Option<f64>,
    pub integral: Option<f64>,
    pub cnt: Option<i64>,
}

/// The slice of the `state` response the collector cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KettleState {
    pub mode: Option<String>,
    pub current_temp: Option<f64>,
    pub target_temp: Option<f64>,
    pub units: Option<String>,
    pub lifted: bool,
    pub power: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct KettleCliClient {
    cli_url: String,
}

impl KettleCliClient {
    pub fn new(base_url: &str, cli_path: &str) -> Result<Self, CliError> {
        let base = base_url
            .split('?')
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        if base.is_empty() {
            return Err(CliError::MissingBaseUrl);
        }

        // Default to http when no protocol was given
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("http://{}", base)
        };

        let cli_url = if base.ends_with(cli_path.trim_matches('/')) {
            base
        } else if cli_path.starts_with('/') {
            format!("{}{}", base, cli_path)
        } else {
            format!("{}/{}", base, cli_path)
        };

        Ok(Self { cli_url })
    }

    pub async fn state(&self) -> Result<KettleState, CliError> {
        let body = self.command("state").await?;
        Ok(parse_state(&body))
    }

    pub async fn pwmprt(&self) -> Result<PwmReport, CliError> {
        let body = self.command("pwmprt").await?;
        Ok(parse_pwmprt(&body))
    }

    pub async fn set_power(&self, on: bool) -> Result<(), CliError> {
        let state = if on { "S_Heat" } else { "S_Off" };
        self.command(&format!("setstate {}", state)).await?;
        Ok(())
    }

    async fn command(&self, command: &str) -> Result<String, CliError> {
        let url = format!("{}?cmd={}", self.cli_url, encode_command(command));
        tracing::debug!("kettle CLI: {}", command);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CliError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}

/// Space-delimited CLI arguments ride inside a single query parameter.
fn encode_command(command: &str) -> String {
    command.replace(' ', "+").replace('\n', "%0A")
}

/// `pwmprt` responds with space-separated `key value` pairs, e.g.
/// `pwm tempr 37.81 setp 40.00 out 60.0 err 2.19 integral 12.3 cnt 42`.
/// Non-finite readings (a lifted kettle reports `nan`) parse to None.
pub fn parse_pwmprt(body: &str) -> PwmReport {
    let mut report = PwmReport::default();
    let tokens: Vec<&str> = body.split_whitespace().collect();
    for pair in tokens.windows(2) {
        let value = pair[1];
        match pair[0].to_ascii_lowercase().as_str() {
            "tempr" => report.tempr = parse_reading(value),
            "setp" => report.setp = parse_reading(value),
            "out" => report.out = parse_reading(value),
            "err" => report.err = parse_reading(value),
            "integral" => report.integral = parse_reading(value),
            "cnt" => report.cnt = value.parse().ok(),
            _ => {}
        }
    }
    report
}

/// `state` responds with `key=value` tokens. Temperatures may carry a C/F
/// suffix; Fahrenheit is normalized to Celsius. Readings outside a plausible
/// range are dropped rather than charted.
pub fn parse_state(body: &str) -> KettleState {
    let fields = key_values(body);

    let mode = fields.get("mode").map(|m| m.to_ascii_uppercase());

    let mut current_temp = fields.get("tempr").and_then(|v| parse_temp(v));
    if let Some(t) = current_temp {
        if !(0.0..=120.0).contains(&t) {
            current_temp = None;
        }
    }

    let mut target_temp = fields.get("temprt").and_then(|v| parse_temp(v));
    if let Some(t) = target_temp {
        if !(30.0..=100.0).contains(&t) {
            target_temp = None;
        }
    }

    // Units flag from the kettle (0=F, 1=C) is the primary truth
    let units = fields
        .get("units")
        .map(|u| if u == "1" { "C" } else { "F" }.to_string());

    let lifted = fields
        .get("tempr")
        .map(|v| v.eq_ignore_ascii_case("nan"))
        .unwrap_or(false);

    let power = mode.as_deref().map(|m| m != "S_OFF");

    KettleState {
        mode,
        current_temp,
        target_temp,
        units,
        lifted,
        power,
    }
}

fn key_values(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for token in body.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            if !key.is_empty() {
                // First occurrence wins, matching the firmware's echo order
                fields
                    .entry(key.to_ascii_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }
    }
    fields
}

fn parse_reading(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_temp(value: &str) -> Option<f64> {
    let value = value.trim();
    let (digits, fahrenheit) = match value.chars().last() {
        Some('C') | Some('c') => (&value[..value.len() - 1], false),
        Some('F') | Some('f') => (&value[..value.len() - 1], true),
        _ => (value, false),
    };
    let reading = parse_reading(digits)?;
    Some(if fahrenheit {
        (reading - 32.0) / 1.8
    } else {
        reading
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        assert_eq!(encode_command("setstate S_Heat"), "setstate+S_Heat");
        assert_eq!(encode_command("setclock 7 30 0"), "setclock+7+30+0");
    }

    #[test]
    fn test_base_url_normalization() {
        let client = KettleCliClient::new("192.168.1.50", "/cli").unwrap();
        assert_eq!(client.cli_url, "http://192.168.1.50/cli");

        let client = KettleCliClient::new("http://kettle.local/", "/cli").unwrap();
        assert_eq!(client.cli_url, "http://kettle.local/cli");

        // Already pointing at the CLI path
        let client = KettleCliClient::new("http://kettle.local/cli?cmd=state", "/cli").unwrap();
        assert_eq!(client.cli_url, "http://kettle.local/cli");

        assert!(matches!(
            KettleCliClient::new("", "/cli"),
            Err(CliError::MissingBaseUrl)
        ));
    }

    #[test]
    fn test_parse_pwmprt() {
        let report =
            parse_pwmprt("pwm tempr 37.81 setp 40.00 out 60.0 err 2.19 integral 12.3 cnt 42");
        assert_eq!(report.tempr, Some(37.81));
        assert_eq!(report.setp, Some(40.0));
        assert_eq!(report.out, Some(60.0));
        assert_eq!(report.err, Some(2.19));
        assert_eq!(report.integral, Some(12.3));
        assert_eq!(report.cnt, Some(42));
    }

    #[test]
    fn test_parse_pwmprt_lifted_and_partial() {
        let report = parse_pwmprt("pwm tempr nan setp 40.00 out 0.0");
        assert_eq!(report.tempr, None);
        assert_eq!(report.setp, Some(40.0));
        assert_eq!(report.out, Some(0.0));
        assert_eq!(report.cnt, None);

        assert_eq!(parse_pwmprt(""), PwmReport::default());
    }

    #[test]
    fn test_parse_state() {
        let state = parse_state("mode=S_Heat tempr=37.8C temprT=104F units=1 nw=0");
        assert_eq!(state.mode.as_deref(), Some("S_HEAT"));
        assert_eq!(state.current_temp, Some(37.8));
        // 104F -> 40C
        assert!((state.target_temp.unwrap() - 40.0).abs() < 1e-9);
        assert_eq!(state.units.as_deref(), Some("C"));
        assert!(!state.lifted);
        assert_eq!(state.power, Some(true));
    }

    #[test]
    fn test_parse_state_lifted_kettle() {
        let state = parse_state("mode=S_Off tempr=nan temprT=40C units=0");
        assert!(state.lifted);
        assert_eq!(state.current_temp, None);
        assert_eq!(state.units.as_deref(), Some("F"));
        assert_eq!(state.power, Some(false));
    }

    #[test]
    fn test_parse_state_drops_implausible_readings() {
        let state = parse_state("mode=S_Heat tempr=250C temprT=5C");
        assert_eq!(state.current_temp, None);
        assert_eq!(state.target_temp, None);
    }
}
