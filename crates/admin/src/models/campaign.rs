//! AI marketing campaign models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use treggio_core::{CampaignId, CampaignStatus, UserId};

/// A generated marketing campaign, persisted for the tenant's history.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    /// e.g. `{"age": "25-35", "interests": ["moda", "tecnología"]}`
    pub target_audience: serde_json::Value,
    /// Ad copy variants, e.g. `["Texto 1", "Texto 2"]`
    pub ad_copy: serde_json::Value,
    /// e.g. `{"colors": ["#FF5733"], "mood": "moderno"}`
    pub visual_style: serde_json::Value,
    pub call_to_action: String,
    pub status: CampaignStatus,
    pub generated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub versions: Vec<CampaignVersion>,
}

/// An immutable snapshot of campaign content; regeneration appends versions.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignVersion {
    pub id: i32,
    pub campaign_id: CampaignId,
    pub version: i32,
    /// Full campaign snapshot at this version.
    pub data: serde_json::Value,
    pub change_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Campaign content as parsed from the model's JSON output, before any row
/// exists. Shapes are already coerced by the parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedCampaign {
    pub name: String,
    pub description: String,
    pub target_audience: serde_json::Value,
    pub ad_copy: Vec<String>,
    pub visual_style: serde_json::Value,
    pub call_to_action: String,
}

impl GeneratedCampaign {
    /// Snapshot payload stored in the version audit trail.
    #[must_use]
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "target_audience": self.target_audience,
            "ad_copy": self.ad_copy,
            "visual_style": self.visual_style,
            "call_to_action": self.call_to_action,
        })
    }
}
