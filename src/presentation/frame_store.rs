// Latest rendered frame, shared between the poller and the HTTP handlers
use crate::application::card_presenter::CardPresenter;
use crate::domain::card::Card;
use crate::infrastructure::chart_png::ChartRenderer;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub card: Option<Card>,
    pub png: Option<Vec<u8>>,
}

/// Single-writer frame slot: the poller replaces it wholesale, handlers only
/// read clones.
#[derive(Default)]
pub struct FrameStore {
    frame: RwLock<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, card: Card, png: Option<Vec<u8>>) {
        *self.frame.write().await = Frame {
            card: Some(card),
            png,
        };
    }

    pub async fn frame(&self) -> Frame {
        self.frame.read().await.clone()
    }
}

/// Renders each published card to a PNG frame and stores it for the HTTP
/// surface.
pub struct RenderingPresenter {
    renderer: ChartRenderer,
    store: Arc<FrameStore>,
}

impl RenderingPresenter {
    pub fn new(renderer: ChartRenderer, store: Arc<FrameStore>) -> Self {
        Self { renderer, store }
    }
}

#[async_trait]
impl CardPresenter for RenderingPresenter {
    async fn present(&self, card: &Card) -> anyhow::Result<()> {
        let png = self.renderer.render(card).await?;
        self.store.set(card.clone(), Some(png)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_replaces_the_whole_frame() {
        let store = FrameStore::new();
        assert!(store.frame().await.card.is_none());

        store
            .set(
                Card::new("a".into(), None, Some("notice".into()), None),
                Some(vec![1, 2, 3]),
            )
            .await;
        store
            .set(Card::new("b".into(), None, None, None), None)
            .await;

        let frame = store.frame().await;
        assert_eq!(frame.card.unwrap().title, "b");
        assert!(frame.png.is_none());
    }
}
