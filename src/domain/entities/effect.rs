//! Active effect entity - Status effects living on actors

use serde::{Deserialize, Serialize};

use crate::domain::entities::TestSnapshot;
use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId, MessageId};

/// How an effect is handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// Applies to the document it lives on
    #[default]
    Document,
    /// Applied to tokens inside a placed template
    Area,
    /// Radiates from the owning token to others nearby
    Aura,
    /// Applied directly to a targeted token
    Target,
    Other,
}

/// Area-specific transfer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaTransfer {
    /// Do not remove the applied effect when the token leaves the area
    pub keep: bool,
    /// Aura radius in game units
    pub radius: Option<f64>,
    /// Template fields overriding the synthetic aura template
    pub template_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferData {
    #[serde(rename = "type")]
    pub kind: TransferKind,
    pub area: AreaTransfer,
}

/// System flags on an effect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectFlags {
    /// Identity of the area that applied this effect
    pub from_area: Option<DocumentUuid>,
    pub source_message: Option<MessageId>,
    pub source_test: Option<TestSnapshot>,
}

/// A single attribute modification carried by an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectChange {
    pub key: String,
    pub mode: u8,
    pub value: String,
}

/// Data needed to create an effect document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectPayload {
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub transfer: TransferData,
    #[serde(default)]
    pub flags: EffectFlags,
    #[serde(default)]
    pub changes: Vec<EffectChange>,
}

impl EffectPayload {
    /// Prepare this effect for application to a token's actor
    ///
    /// The copy no longer radiates or spreads: its transfer kind becomes
    /// `Document`, while `keep` survives so the engine can honor it.
    pub fn convert_to_applied(&self, test: Option<&TestSnapshot>) -> EffectPayload {
        let mut applied = self.clone();
        applied.transfer.kind = TransferKind::Document;
        applied.transfer.area.radius = None;
        applied.transfer.area.template_data = None;
        applied.flags.from_area = None;
        if let Some(test) = test {
            applied.flags.source_message = test.message_id;
            applied.flags.source_test = Some(test.clone());
        }
        applied
    }

    /// Materialize as a document with a fresh id
    pub fn into_effect(self, actor_id: ActorId) -> ActiveEffect {
        ActiveEffect {
            id: EffectId::new(),
            actor_id,
            data: self,
        }
    }
}

/// Builders for payloads assembled in tests
#[cfg(test)]
impl EffectPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disabled: false,
            transfer: TransferData::default(),
            flags: EffectFlags::default(),
            changes: Vec::new(),
        }
    }

    pub fn with_transfer(mut self, kind: TransferKind) -> Self {
        self.transfer.kind = kind;
        self
    }

    pub fn with_keep(mut self, keep: bool) -> Self {
        self.transfer.area.keep = keep;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.transfer.area.radius = Some(radius);
        self
    }

    pub fn with_template_data(mut self, data: serde_json::Value) -> Self {
        self.transfer.area.template_data = Some(data);
        self
    }

    pub fn with_change(mut self, key: impl Into<String>, mode: u8, value: impl Into<String>) -> Self {
        self.changes.push(EffectChange {
            key: key.into(),
            mode,
            value: value.into(),
        });
        self
    }
}

/// An effect document on an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: EffectId,
    pub actor_id: ActorId,
    #[serde(flatten)]
    pub data: EffectPayload,
}

impl ActiveEffect {
    pub fn uuid(&self) -> DocumentUuid {
        DocumentUuid::for_effect(self.actor_id, self.id)
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn from_area(&self) -> Option<&DocumentUuid> {
        self.data.flags.from_area.as_ref()
    }

    pub fn keep(&self) -> bool {
        self.data.transfer.area.keep
    }

    pub fn radius(&self) -> Option<f64> {
        self.data.transfer.area.radius
    }

    pub fn template_data(&self) -> Option<&serde_json::Value> {
        self.data.transfer.area.template_data.as_ref()
    }

    /// An enabled aura radiating from this actor (not one received from an area)
    pub fn is_aura(&self) -> bool {
        self.data.transfer.kind == TransferKind::Aura
            && !self.data.disabled
            && self.data.flags.from_area.is_none()
    }
}
