//! Use cases offered to the host

use async_trait::async_trait;

use crate::application::dto::{ReconcileError, ReconcileReport};
use crate::domain::entities::Token;
use crate::domain::value_objects::{SceneId, TemplateId};

/// Area effect use cases invoked on scene refresh
#[async_trait]
pub trait AreaEffectsUseCase: Send + Sync {
    /// Run one reconciliation pass; `None` means the current scene
    async fn reconcile(&self, scene_id: Option<SceneId>) -> Result<ReconcileReport, ReconcileError>;

    /// Tokens whose centers lie inside a placed template
    async fn tokens_in_template(
        &self,
        scene_id: SceneId,
        template_id: TemplateId,
    ) -> Result<Vec<Token>, ReconcileError>;
}
