//! Scene entity - Tokens and placed templates on a gridded canvas

use serde::{Deserialize, Serialize};

use crate::domain::entities::{MeasuredTemplate, Token};
use crate::domain::value_objects::{DocumentUuid, GridConfig, SceneId, TemplateId, TokenId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub templates: Vec<MeasuredTemplate>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(),
            name: name.into(),
            grid: GridConfig::default(),
            tokens: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    #[cfg(test)]
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    #[cfg(test)]
    pub fn with_template(mut self, template: MeasuredTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn template(&self, id: TemplateId) -> Option<&MeasuredTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn remove_template(&mut self, id: TemplateId) -> Option<MeasuredTemplate> {
        let index = self.templates.iter().position(|t| t.id == id)?;
        Some(self.templates.remove(index))
    }

    pub fn template_uuid(&self, id: TemplateId) -> DocumentUuid {
        DocumentUuid::for_template(self.id, id)
    }
}
