//! AI marketing campaign generation.
//!
//! Builds a catalog-derived prompt, asks DeepSeek for exactly three
//! campaigns in JSON, parses the answer defensively, and persists the result
//! with a version-1 snapshot per campaign.

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

use treggio_core::{CampaignId, UserId};

use crate::ai::{DeepSeekClient, DeepSeekError, Message};
use crate::db::campaigns::CampaignRepository;
use crate::db::categories::CategoryRepository;
use crate::db::products::{ProductFilter, ProductRepository};
use crate::db::RepositoryError;
use crate::models::campaign::{Campaign, CampaignVersion, GeneratedCampaign};
use crate::models::catalog::Product;

const SYSTEM_PROMPT: &str = "Eres un generador de campañas de marketing. Responde EXCLUSIVAMENTE \
     con el JSON solicitado, sin comentarios adicionales.";

/// Errors from campaign generation.
#[derive(Debug, Error)]
pub enum MarketingError {
    /// The tenant has no products to build campaigns from.
    #[error("no products to generate campaigns for")]
    NoProducts,

    /// DeepSeek API failure.
    #[error(transparent)]
    Ai(#[from] DeepSeekError),

    /// The model's output could not be parsed into campaigns.
    #[error("generated content is not valid campaign JSON: {0}")]
    BadContent(String),

    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Generation options forwarded from the request.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// `profesional`, `divertido`, or `emocional`.
    pub tone: Option<String>,
    /// `moderno`, `minimalista`, or `vibrante`.
    pub style: Option<String>,
}

/// Campaign generation service.
pub struct MarketingService<'a> {
    pool: &'a PgPool,
    client: &'a DeepSeekClient,
}

impl<'a> MarketingService<'a> {
    /// Create a new marketing service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, client: &'a DeepSeekClient) -> Self {
        Self { pool, client }
    }

    /// Generate three campaigns from the tenant's catalog and persist them.
    ///
    /// # Errors
    ///
    /// Returns `NoProducts` for empty catalogs, `Ai` for API failures, and
    /// `BadContent` when the completion cannot be parsed.
    pub async fn generate(
        &self,
        user_id: UserId,
        options: &GenerationOptions,
    ) -> Result<Vec<Campaign>, MarketingError> {
        let products = ProductRepository::new(self.pool);
        let (catalog, total) = products
            .list(user_id, &ProductFilter::default(), 1)
            .await?;
        if total == 0 {
            return Err(MarketingError::NoProducts);
        }

        let category_names = self.category_names(user_id).await?;
        let prompt = build_prompt(&catalog, &category_names, options);
        tracing::debug!(
            user_id = %user_id,
            prompt_preview = %prompt.chars().take(200).collect::<String>(),
            "Campaign prompt built"
        );

        let content = self
            .client
            .complete(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)])
            .await?;

        let generated = parse_campaigns(&content)?;
        tracing::info!(
            user_id = %user_id,
            campaigns = generated.len(),
            "Campaigns generated"
        );

        let repo = CampaignRepository::new(self.pool);
        Ok(repo.save_generated(user_id, &generated).await?)
    }

    /// Regenerate a campaign's content, appending it as the next version.
    ///
    /// # Errors
    ///
    /// Returns `Repository(NotFound)` for campaigns outside the tenant.
    pub async fn regenerate(
        &self,
        user_id: UserId,
        campaign_id: CampaignId,
        options: &GenerationOptions,
    ) -> Result<(GeneratedCampaign, CampaignVersion), MarketingError> {
        let repo = CampaignRepository::new(self.pool);
        let campaign = repo
            .get(user_id, campaign_id)
            .await?
            .ok_or(MarketingError::Repository(RepositoryError::NotFound))?;

        let products = ProductRepository::new(self.pool);
        let (catalog, _) = products
            .list(user_id, &ProductFilter::default(), 1)
            .await?;
        let category_names = self.category_names(user_id).await?;

        let mut prompt = build_prompt(&catalog, &category_names, options);
        prompt.push_str(&format!(
            "\n\nRegenera una única campaña que reemplace a \"{}\". Devuelve el mismo formato \
             JSON con exactamente 1 campaña.",
            campaign.name
        ));

        let content = self
            .client
            .complete(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)])
            .await?;

        let mut generated = parse_campaigns_lenient(&content, 1)?;
        let new_content = generated
            .pop()
            .ok_or_else(|| MarketingError::BadContent("no campaign in response".to_string()))?;

        let version = repo
            .add_version(campaign_id, &new_content.snapshot(), Some("regenerated"))
            .await?;

        Ok((new_content, version))
    }

    async fn category_names(
        &self,
        user_id: UserId,
    ) -> Result<std::collections::HashMap<i32, String>, RepositoryError> {
        let categories = CategoryRepository::new(self.pool);
        let mut names = std::collections::HashMap::new();
        for depth in 1..=3 {
            for category in categories.list_by_depth(user_id, depth, false).await? {
                names.insert(category.id.as_i32(), category.name);
            }
        }
        Ok(names)
    }
}

/// Build the generation prompt from the tenant's products.
fn build_prompt(
    products: &[Product],
    category_names: &std::collections::HashMap<i32, String>,
    options: &GenerationOptions,
) -> String {
    let product_info = products
        .iter()
        .map(|product| {
            let category_path: Vec<&str> = [
                product.category_first_id,
                product.category_second_id,
                product.category_third_id,
            ]
            .iter()
            .flatten()
            .filter_map(|id| category_names.get(&id.as_i32()).map(String::as_str))
            .collect();
            let category = if category_path.is_empty() {
                "Sin categoría".to_string()
            } else {
                category_path.join(" > ")
            };

            let tags = product.tags.as_ref().map(normalize_tags).unwrap_or_default();
            let tags_line = if tags.is_empty() {
                "Sin etiquetas".to_string()
            } else {
                format!("Etiquetas: {}", tags.join(", "))
            };

            format!(
                "Producto: {}\nDescripción: {}\nCategorías: {}\nPrecio: {}\n{}",
                product.title,
                product.description.as_deref().unwrap_or("Sin descripción"),
                category,
                product.price,
                tags_line
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = format!(
        "Genera EXACTAMENTE 3 campañas de marketing en formato JSON para estos productos:\n\n\
         ### Productos:\n{product_info}\n\n\
         ### Instrucciones:\n\
         - Formato requerido: JSON válido\n\
         - Cada campaña debe incluir: nombre, descripción, audiencia, textos publicitarios, \
         estilo visual\n\
         - Usa el siguiente formato:\n\n\
         {{\n  \"campaigns\": [\n    {{\n      \"name\": \"Nombre creativo\",\n      \
         \"description\": \"Objetivo de campaña\",\n      \"target_audience\": {{\n        \
         \"age\": \"25-35\",\n        \"interests\": [\"moda\", \"tecnología\"]\n      }},\n      \
         \"ad_copy\": [\"Texto 1\", \"Texto 2\"],\n      \"visual_style\": {{\n        \
         \"colors\": [\"#FF5733\"],\n        \"mood\": \"moderno\"\n      }},\n      \
         \"call_to_action\": \"¡Compra ahora!\"\n    }}\n  ]\n}}"
    );

    if let Some(tone) = options.tone.as_deref() {
        prompt.push_str(&format!("\n- Tono de la campaña: {tone}"));
    }
    if let Some(style) = options.style.as_deref() {
        prompt.push_str(&format!("\n- Estilo visual preferido: {style}"));
    }

    prompt
}

/// Normalize a stored tags value into a flat list of strings.
///
/// Accepts plain arrays, JSON-encoded strings, and legacy arrays of objects
/// (taking the first of `name`/`tag`/`title`/`label`/`value`/`item_id`).
fn normalize_tags(tags: &Value) -> Vec<String> {
    match tags {
        Value::Null => Vec::new(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(decoded) if !matches!(decoded, Value::String(_)) => normalize_tags(&decoded),
            _ => vec![s.clone()],
        },
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Value::Object(map) => {
                        for field in ["name", "tag", "title", "label", "value", "item_id"] {
                            if let Some(value) = map.get(field) {
                                let text = scalar_to_string(value);
                                if !text.is_empty() {
                                    if field == "item_id" && value.is_number() {
                                        out.push(format!("item_{text}"));
                                    } else {
                                        out.push(text);
                                    }
                                    break;
                                }
                            }
                        }
                    }
                    other => {
                        let text = scalar_to_string(other);
                        if !text.is_empty() {
                            out.push(text);
                        }
                    }
                }
            }
            out.dedup();
            out
        }
        other => {
            let text = scalar_to_string(other);
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Parse the model's completion into exactly the expected campaigns.
///
/// # Errors
///
/// Returns `BadContent` if the JSON cannot be parsed or contains no
/// `campaigns` array.
fn parse_campaigns(content: &str) -> Result<Vec<GeneratedCampaign>, MarketingError> {
    parse_campaigns_lenient(content, 3)
}

/// Like [`parse_campaigns`] but accepting any count up to `max`.
fn parse_campaigns_lenient(
    content: &str,
    max: usize,
) -> Result<Vec<GeneratedCampaign>, MarketingError> {
    let stripped = strip_code_fences(content);
    let data: Value = serde_json::from_str(stripped)
        .map_err(|e| MarketingError::BadContent(e.to_string()))?;

    let Some(campaigns) = data.get("campaigns").and_then(Value::as_array) else {
        return Err(MarketingError::BadContent(
            "missing 'campaigns' array".to_string(),
        ));
    };

    let parsed: Vec<GeneratedCampaign> = campaigns
        .iter()
        .take(max)
        .map(coerce_campaign)
        .collect();

    if parsed.is_empty() {
        return Err(MarketingError::BadContent("empty campaign list".to_string()));
    }
    Ok(parsed)
}

/// Coerce one campaign object, tolerating missing or mistyped fields.
fn coerce_campaign(raw: &Value) -> GeneratedCampaign {
    let ad_copy = match raw.get("ad_copy") {
        Some(Value::Array(items)) => items.iter().map(scalar_to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    };

    GeneratedCampaign {
        name: raw
            .get("name")
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Campaña sin nombre".to_string()),
        description: raw.get("description").map(scalar_to_string).unwrap_or_default(),
        target_audience: coerce_object(raw.get("target_audience")),
        ad_copy,
        visual_style: coerce_object(raw.get("visual_style")),
        call_to_action: raw
            .get("call_to_action")
            .map(scalar_to_string)
            .unwrap_or_default(),
    }
}

/// Coerce a value into a JSON object, decoding stringified JSON if needed.
fn coerce_object(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(Value::String(s)) => {
            serde_json::from_str::<Value>(s).map_or_else(|_| serde_json::json!({}), |decoded| {
                if decoded.is_object() { decoded } else { serde_json::json!({}) }
            })
        }
        _ => serde_json::json!({}),
    }
}

/// Strip markdown code fences some models wrap JSON in.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_tags_plain_array() {
        let tags = json!(["verano", "ofertas", 2025]);
        assert_eq!(normalize_tags(&tags), vec!["verano", "ofertas", "2025"]);
    }

    #[test]
    fn test_normalize_tags_json_string() {
        let tags = json!("[\"rojo\", \"azul\"]");
        assert_eq!(normalize_tags(&tags), vec!["rojo", "azul"]);
    }

    #[test]
    fn test_normalize_tags_plain_string() {
        let tags = json!("artesanal");
        assert_eq!(normalize_tags(&tags), vec!["artesanal"]);
    }

    #[test]
    fn test_normalize_tags_object_array() {
        let tags = json!([
            {"name": "moda"},
            {"label": "tendencia"},
            {"item_id": 42}
        ]);
        assert_eq!(normalize_tags(&tags), vec!["moda", "tendencia", "item_42"]);
    }

    #[test]
    fn test_normalize_tags_null() {
        assert!(normalize_tags(&Value::Null).is_empty());
    }

    #[test]
    fn test_parse_campaigns_happy_path() {
        let content = json!({
            "campaigns": [
                {
                    "name": "Verano Total",
                    "description": "Impulsar ventas de temporada",
                    "target_audience": {"age": "25-35", "interests": ["moda"]},
                    "ad_copy": ["Texto 1", "Texto 2"],
                    "visual_style": {"colors": ["#FF5733"], "mood": "moderno"},
                    "call_to_action": "¡Compra ahora!"
                },
                {"name": "B", "description": "", "ad_copy": [], "call_to_action": ""},
                {"name": "C", "description": "", "ad_copy": [], "call_to_action": ""},
                {"name": "D (extra, dropped)", "description": ""}
            ]
        })
        .to_string();

        let campaigns = parse_campaigns(&content).unwrap();
        assert_eq!(campaigns.len(), 3);
        assert_eq!(campaigns[0].name, "Verano Total");
        assert_eq!(campaigns[0].ad_copy, vec!["Texto 1", "Texto 2"]);
    }

    #[test]
    fn test_parse_campaigns_strips_code_fences() {
        let content = "```json\n{\"campaigns\": [{\"name\": \"X\"}]}\n```";
        let campaigns = parse_campaigns(content).unwrap();
        assert_eq!(campaigns[0].name, "X");
    }

    #[test]
    fn test_parse_campaigns_coerces_stringified_objects() {
        let content = json!({
            "campaigns": [{
                "name": "Y",
                "target_audience": "{\"age\": \"18-24\"}",
                "visual_style": "not json"
            }]
        })
        .to_string();

        let campaigns = parse_campaigns(&content).unwrap();
        assert_eq!(campaigns[0].target_audience, json!({"age": "18-24"}));
        assert_eq!(campaigns[0].visual_style, json!({}));
    }

    #[test]
    fn test_parse_campaigns_missing_name_defaults() {
        let content = json!({"campaigns": [{"description": "sin nombre"}]}).to_string();
        let campaigns = parse_campaigns(&content).unwrap();
        assert_eq!(campaigns[0].name, "Campaña sin nombre");
    }

    #[test]
    fn test_parse_campaigns_rejects_bad_shapes() {
        assert!(parse_campaigns("not json at all").is_err());
        assert!(parse_campaigns("{\"other\": 1}").is_err());
        assert!(parse_campaigns("{\"campaigns\": []}").is_err());
    }

    #[test]
    fn test_build_prompt_mentions_products_and_options() {
        let prompt_products: Vec<Product> = Vec::new();
        let prompt = build_prompt(
            &prompt_products,
            &std::collections::HashMap::new(),
            &GenerationOptions {
                tone: Some("divertido".to_string()),
                style: Some("vibrante".to_string()),
            },
        );
        assert!(prompt.contains("EXACTAMENTE 3 campañas"));
        assert!(prompt.contains("Tono de la campaña: divertido"));
        assert!(prompt.contains("Estilo visual preferido: vibrante"));
    }
}
