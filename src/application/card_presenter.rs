// Presentation seam for finished card frames
use crate::domain::card::Card;
use async_trait::async_trait;

#[async_trait]
pub trait CardPresenter: Send + Sync {
    /// Publish one finished frame. An error aborts only this cycle's render;
    /// the next cycle tries again.
    async fn present(&self, card: &Card) -> anyhow::Result<()>;
}
