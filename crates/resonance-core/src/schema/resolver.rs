//! Schema discovery over the input header row.
//!
//! Discovery is anchored on data columns: an entity or narrative exists when
//! at least one of its prominence/sentiment/description/quality columns is
//! recognizable under either dialect. Label columns (state, modifier) are
//! bound afterwards per subject through the no-fuzzy label path.

use tracing::warn;

use super::fuzzy::{normalize_data, ColumnMatch, HeaderIndex};
use super::{
    EntityBinding, HeaderDialect, NarrativeBinding, Result, SchemaError, SchemaMap,
};

// ============================================================================
// WELL-KNOWN COLUMNS
// ============================================================================

/// Prefix-dialect topic prominence column
pub const TOPIC_PROMINENCE: &str = "Topic_Prominence";
/// Prefix-dialect topic sentiment column
pub const TOPIC_SENTIMENT: &str = "Topic_Sentiment";
/// Prefix-dialect topic state column
pub const TOPIC_STATE: &str = "Topic_State";
/// Coded-dialect topic prominence column
pub const CODED_TOPIC_PROMINENCE: &str = "O_Overall - Overall-Level Prominence";
/// Coded-dialect topic sentiment column
pub const CODED_TOPIC_SENTIMENT: &str = "O_Overall - Overall-Level Sentiment";
/// Outlet-tier column names, in preference order
pub const OUTLET_TIER_COLUMNS: [&str; 2] = ["Outlet score", "Orchestra_Pub_Tier"];
/// Date column
pub const DATE_COLUMN: &str = "Date";
/// Publication column
pub const PUBLICATION_COLUMN: &str = "Publication";
/// Body word-count column (validator only)
pub const BODY_LENGTH_COLUMN: &str = "Body - Length - Words";

const ENTITY_DATA_SUFFIXES: [&str; 5] = [
    "_Super_Prominence",
    "_Prominence",
    "_Sentiment",
    "_Description",
    "_Quality_Score",
];

const NARRATIVE_DATA_SUFFIXES: [&str; 3] = ["_Prominence", "_Sentiment", "_Description"];

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Resolver configuration. Immutable; passed to the resolver constructor.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Whether topic columns may fall back to the first entity's columns
    pub allow_topic_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            allow_topic_fallback: true,
        }
    }
}

// ============================================================================
// DISCOVERY SCRATCH STATE
// ============================================================================

#[derive(Debug, Default)]
struct CodedEntity {
    id: u32,
    name: Option<String>,
}

#[derive(Debug, Default)]
struct CodedNarrative {
    id: u32,
    description: Option<String>,
    long_prominence: Option<String>,
    long_sentiment: Option<String>,
}

fn parse_coded_entity_long(header: &str) -> Option<(u32, String, String)> {
    // "<k>_<Name> - Company-Level <Field>"
    let (head, field) = header.split_once(" - Company-Level ")?;
    let (id_str, name) = head.split_once('_')?;
    let id: u32 = id_str.parse().ok()?;
    if name.is_empty() || field.trim().is_empty() {
        return None;
    }
    Some((id, name.to_string(), field.trim().to_string()))
}

fn parse_coded_entity_short(header: &str) -> Option<(u32, String)> {
    // "<k>_C_Prom" | "<k>_C_Sent" | "<k>_C_State" | "<k>_C_Modifier"
    let (id_str, field) = header.split_once("_C_")?;
    let id: u32 = id_str.parse().ok()?;
    Some((id, field.to_string()))
}

fn parse_coded_entity_quality(header: &str) -> Option<u32> {
    // "<k>_Orchestra_Quality_Score"
    let id_str = header.strip_suffix("_Orchestra_Quality_Score")?;
    id_str.parse().ok()
}

fn parse_coded_narrative_long(header: &str) -> Option<(u32, String, Option<String>)> {
    // "O_Overall - Message <k> <Field> (<Description>)"
    let rest = header.strip_prefix("O_Overall - Message ")?;
    let (id_str, tail) = rest.split_once(' ')?;
    let id: u32 = id_str.parse().ok()?;
    let (field, description) = match tail.split_once(" (") {
        Some((field, desc)) => (
            field.trim().to_string(),
            Some(desc.trim_end_matches(')').to_string()),
        ),
        None => (tail.trim().to_string(), None),
    };
    Some((id, field, description))
}

fn parse_coded_narrative_short(header: &str) -> Option<(u32, String)> {
    // "O_M_<k>prom" | "O_M_<k>sent"
    let rest = header.strip_prefix("O_M_")?;
    let split = rest.find(|c: char| !c.is_ascii_digit())?;
    if split == 0 {
        return None;
    }
    let (id_str, field) = rest.split_at(split);
    let id: u32 = id_str.parse().ok()?;
    Some((id, field.to_string()))
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Deterministic schema discovery over a header list.
///
/// # Example
///
/// ```rust
/// use resonance_core::schema::SchemaResolver;
///
/// let headers: Vec<String> = [
///     "Date", "Publication", "Outlet score",
///     "Topic_Prominence", "Topic_Sentiment",
///     "Narrative_Momentum_Prominence", "Narrative_Momentum_Sentiment",
///     "Enity_Acme_Prominence", "Entity_Acme_Sentiment",
/// ]
/// .iter()
/// .map(|h| h.to_string())
/// .collect();
///
/// let schema = SchemaResolver::new().resolve(&headers).unwrap();
/// assert_eq!(schema.entities[0].key, "Acme");
/// assert_eq!(schema.entities[0].prominence, "Enity_Acme_Prominence");
/// ```
#[derive(Debug, Default)]
pub struct SchemaResolver {
    config: ResolverConfig,
}

impl SchemaResolver {
    /// Create a resolver with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Create a resolver with an explicit configuration.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve the header list into a validated [`SchemaMap`].
    ///
    /// Fails with [`SchemaError::MissingFields`] when topic prominence, topic
    /// sentiment, the outlet tier, or every subject binding is unresolvable.
    pub fn resolve(&self, headers: &[String]) -> Result<SchemaMap> {
        let index = HeaderIndex::new(headers);
        let mut warnings: Vec<String> = Vec::new();

        // ---- Discovery: subject keys in first-seen order ----
        let mut prefix_entities: Vec<String> = Vec::new();
        let mut prefix_narratives: Vec<String> = Vec::new();
        let mut coded_entities: Vec<CodedEntity> = Vec::new();
        let mut coded_narratives: Vec<CodedNarrative> = Vec::new();

        for header in headers {
            let normalized = normalize_data(header);

            if let Some(rest) = normalized.strip_prefix("Entity_") {
                for suffix in ENTITY_DATA_SUFFIXES {
                    if let Some(name) = rest.strip_suffix(suffix) {
                        if !name.is_empty() && !prefix_entities.iter().any(|n| n == name) {
                            prefix_entities.push(name.to_string());
                        }
                        break;
                    }
                }
                continue;
            }

            if let Some(rest) = normalized.strip_prefix("Narrative_") {
                for suffix in NARRATIVE_DATA_SUFFIXES {
                    if let Some(name) = rest.strip_suffix(suffix) {
                        if !name.is_empty() && !prefix_narratives.iter().any(|n| n == name) {
                            prefix_narratives.push(name.to_string());
                        }
                        break;
                    }
                }
                continue;
            }

            if let Some((id, name, _field)) = parse_coded_entity_long(header) {
                let entry = coded_entity_entry(&mut coded_entities, id);
                entry.name.get_or_insert(name);
                continue;
            }
            if let Some(id) = parse_coded_entity_quality(header) {
                coded_entity_entry(&mut coded_entities, id);
                continue;
            }
            if let Some((id, field)) = parse_coded_entity_short(header) {
                if matches!(field.as_str(), "Prom" | "Sent") {
                    coded_entity_entry(&mut coded_entities, id);
                }
                continue;
            }

            if let Some((id, field, description)) = parse_coded_narrative_long(header) {
                let entry = coded_narrative_entry(&mut coded_narratives, id);
                if let Some(description) = description {
                    entry.description.get_or_insert(description);
                }
                match field.as_str() {
                    "Prominence" => {
                        entry.long_prominence.get_or_insert(header.clone());
                    }
                    "Sentiment" => {
                        entry.long_sentiment.get_or_insert(header.clone());
                    }
                    _ => {}
                }
                continue;
            }
            if let Some((id, field)) = parse_coded_narrative_short(header) {
                if matches!(field.as_str(), "prom" | "sent") {
                    coded_narrative_entry(&mut coded_narratives, id);
                }
            }
        }

        let prefix_seen = !prefix_entities.is_empty() || !prefix_narratives.is_empty();
        let coded_seen = !coded_entities.is_empty() || !coded_narratives.is_empty();
        let dialect = match (prefix_seen, coded_seen) {
            (true, false) => HeaderDialect::Prefix,
            (false, true) => HeaderDialect::Coded,
            _ => HeaderDialect::Mixed,
        };

        // ---- Bind entities ----
        let mut entities: Vec<EntityBinding> = Vec::new();
        for name in &prefix_entities {
            match self.bind_prefix_entity(&index, name, &mut warnings) {
                Some(binding) => entities.push(binding),
                None => warnings.push(format!(
                    "entity \"{name}\" dropped: prominence and sentiment could not both be bound"
                )),
            }
        }
        for coded in &coded_entities {
            match self.bind_coded_entity(&index, coded, &mut warnings) {
                Some(binding) => entities.push(binding),
                None => warnings.push(format!(
                    "entity #{} dropped: prominence and sentiment could not both be bound",
                    coded.id
                )),
            }
        }

        // ---- Bind narratives (discovery order is the tie precedence) ----
        let mut narratives: Vec<NarrativeBinding> = Vec::new();
        for name in &prefix_narratives {
            match self.bind_prefix_narrative(&index, name, &mut warnings) {
                Some(binding) => narratives.push(binding),
                None => warnings.push(format!(
                    "narrative \"{name}\" dropped: prominence and sentiment could not both be bound"
                )),
            }
        }
        for coded in &coded_narratives {
            match self.bind_coded_narrative(&index, coded, &mut warnings) {
                Some(binding) => narratives.push(binding),
                None => warnings.push(format!(
                    "narrative #{} dropped: prominence and sentiment could not both be bound",
                    coded.id
                )),
            }
        }

        // ---- Topic ----
        let topic_prominence = self
            .bind_data(&index, &[TOPIC_PROMINENCE, CODED_TOPIC_PROMINENCE], &mut warnings)
            .or_else(|| self.topic_fallback(&entities, "prominence", true, &mut warnings));
        let topic_sentiment = self
            .bind_data(&index, &[TOPIC_SENTIMENT, CODED_TOPIC_SENTIMENT], &mut warnings)
            .or_else(|| self.topic_fallback(&entities, "sentiment", false, &mut warnings));
        let topic_state = index
            .find_label_column(TOPIC_STATE)
            .map(|m| m.column);

        // ---- Ancillary columns ----
        let outlet_tier = OUTLET_TIER_COLUMNS
            .iter()
            .find_map(|name| index.find_label_column(name).map(|m| m.column));
        let date = index.find_label_column(DATE_COLUMN).map(|m| m.column);
        let publication = index
            .find_label_column(PUBLICATION_COLUMN)
            .map(|m| m.column);
        let body_length = index
            .find_label_column(BODY_LENGTH_COLUMN)
            .map(|m| m.column);

        // ---- Required-field validation ----
        let mut missing: Vec<String> = Vec::new();
        if topic_prominence.is_none() {
            missing.push("topic prominence".to_string());
        }
        if topic_sentiment.is_none() {
            missing.push("topic sentiment".to_string());
        }
        if outlet_tier.is_none() {
            missing.push("outlet tier".to_string());
        }
        if entities.is_empty() && narratives.is_empty() {
            missing.push(
                "at least one entity or narrative with prominence and sentiment".to_string(),
            );
        }
        if !missing.is_empty() {
            return Err(SchemaError::MissingFields {
                missing,
                available: headers.to_vec(),
            });
        }

        for warning in &warnings {
            warn!(target: "resonance::schema", "{warning}");
        }

        Ok(SchemaMap {
            dialect,
            topic_prominence: topic_prominence.expect("validated above"),
            topic_sentiment: topic_sentiment.expect("validated above"),
            topic_state,
            outlet_tier: outlet_tier.expect("validated above"),
            date,
            publication,
            body_length,
            entities,
            narratives,
            warnings,
        })
    }

    /// Try each candidate through the full data ladder, recording any
    /// substitution note for the first hit.
    fn bind_data(
        &self,
        index: &HeaderIndex,
        candidates: &[&str],
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        for wanted in candidates {
            if let Some(hit) = index.find_data_column(wanted) {
                record_note(&hit, wanted, warnings);
                return Some(hit.column);
            }
        }
        None
    }

    fn topic_fallback(
        &self,
        entities: &[EntityBinding],
        field: &str,
        prominence: bool,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        if !self.config.allow_topic_fallback {
            return None;
        }
        let first = entities.first()?;
        let column = if prominence {
            first.prominence.clone()
        } else {
            first.sentiment.clone()
        };
        warnings.push(format!(
            "topic {field} missing: falling back to entity \"{}\" column \"{column}\"",
            first.key
        ));
        Some(column)
    }

    fn bind_prefix_entity(
        &self,
        index: &HeaderIndex,
        name: &str,
        warnings: &mut Vec<String>,
    ) -> Option<EntityBinding> {
        // Super_Prominence wins over Prominence when both are present; the
        // probe skips the fuzzy step so it cannot shadow-match the sibling.
        let prominence = index
            .find_data_column_known(&format!("Entity_{name}_Super_Prominence"))
            .or_else(|| index.find_data_column(&format!("Entity_{name}_Prominence")))?;
        let sentiment = index.find_data_column(&format!("Entity_{name}_Sentiment"))?;
        record_note(&prominence, &format!("Entity_{name}_Prominence"), warnings);
        record_note(&sentiment, &format!("Entity_{name}_Sentiment"), warnings);

        let description = index
            .find_data_column(&format!("Entity_{name}_Description"))
            .map(|m| m.column);
        let quality_score = index
            .find_data_column(&format!("Entity_{name}_Quality_Score"))
            .map(|m| m.column);
        let state = index
            .find_label_column(&format!("Entity_{name}_State"))
            .map(|m| m.column);
        let modifier = index
            .find_label_column(&format!("Entity_{name}_Modifier"))
            .map(|m| m.column);

        Some(EntityBinding {
            key: name.to_string(),
            prominence: prominence.column,
            sentiment: sentiment.column,
            description,
            quality_score,
            state,
            modifier,
        })
    }

    fn bind_coded_entity(
        &self,
        index: &HeaderIndex,
        coded: &CodedEntity,
        warnings: &mut Vec<String>,
    ) -> Option<EntityBinding> {
        let id = coded.id;
        let mut prominence_candidates: Vec<String> = Vec::new();
        let mut sentiment_candidates: Vec<String> = Vec::new();
        if let Some(name) = &coded.name {
            prominence_candidates.push(format!("{id}_{name} - Company-Level Prominence"));
            sentiment_candidates.push(format!("{id}_{name} - Company-Level Sentiment"));
        }
        prominence_candidates.push(format!("{id}_C_Prom"));
        sentiment_candidates.push(format!("{id}_C_Sent"));

        let prominence = self.bind_data(
            index,
            &prominence_candidates
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            warnings,
        )?;
        let sentiment = self.bind_data(
            index,
            &sentiment_candidates
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            warnings,
        )?;

        let description = coded.name.as_ref().and_then(|name| {
            index
                .find_data_column_known(&format!("{id}_{name} - Company-Level Description"))
                .map(|m| m.column)
        });
        let quality_score = index
            .find_data_column_known(&format!("{id}_Orchestra_Quality_Score"))
            .map(|m| m.column);

        // Label columns: coded shorthand first, then the canonical derived
        // names a prior diagnostic pass would have written.
        let key = coded.name.clone().unwrap_or_else(|| id.to_string());
        let canonical = format!("Entity_{}", super::sanitize_key(&key));
        let state = index
            .find_label_column(&format!("{id}_C_State"))
            .or_else(|| index.find_label_column(&format!("{canonical}_State")))
            .map(|m| m.column);
        let modifier = index
            .find_label_column(&format!("{id}_C_Modifier"))
            .or_else(|| index.find_label_column(&format!("{canonical}_Modifier")))
            .map(|m| m.column);

        Some(EntityBinding {
            key,
            prominence,
            sentiment,
            description,
            quality_score,
            state,
            modifier,
        })
    }

    fn bind_prefix_narrative(
        &self,
        index: &HeaderIndex,
        name: &str,
        warnings: &mut Vec<String>,
    ) -> Option<NarrativeBinding> {
        let prominence = index.find_data_column(&format!("Narrative_{name}_Prominence"))?;
        let sentiment = index.find_data_column(&format!("Narrative_{name}_Sentiment"))?;
        record_note(&prominence, &format!("Narrative_{name}_Prominence"), warnings);
        record_note(&sentiment, &format!("Narrative_{name}_Sentiment"), warnings);

        let description = index
            .find_data_column(&format!("Narrative_{name}_Description"))
            .map(|m| m.column);
        let state = index
            .find_label_column(&format!("Narrative_{name}_State"))
            .map(|m| m.column);

        Some(NarrativeBinding {
            key: name.to_string(),
            prominence: prominence.column,
            sentiment: sentiment.column,
            description,
            state,
        })
    }

    fn bind_coded_narrative(
        &self,
        index: &HeaderIndex,
        coded: &CodedNarrative,
        _warnings: &mut Vec<String>,
    ) -> Option<NarrativeBinding> {
        let id = coded.id;
        let prominence = coded.long_prominence.clone().or_else(|| {
            index
                .find_data_column_known(&format!("O_M_{id}prom"))
                .map(|m| m.column)
        })?;
        let sentiment = coded.long_sentiment.clone().or_else(|| {
            index
                .find_data_column_known(&format!("O_M_{id}sent"))
                .map(|m| m.column)
        })?;

        // A prior diagnostic pass writes the state under the canonical name
        let state = index
            .find_label_column(&format!("Narrative_Message_{id}_State"))
            .map(|m| m.column);

        Some(NarrativeBinding {
            key: format!("Message_{id}"),
            prominence,
            sentiment,
            description: coded.description.clone(),
            state,
        })
    }
}

fn coded_entity_entry(entities: &mut Vec<CodedEntity>, id: u32) -> &mut CodedEntity {
    if let Some(pos) = entities.iter().position(|e| e.id == id) {
        &mut entities[pos]
    } else {
        entities.push(CodedEntity { id, name: None });
        entities.last_mut().expect("just pushed")
    }
}

fn coded_narrative_entry(narratives: &mut Vec<CodedNarrative>, id: u32) -> &mut CodedNarrative {
    if let Some(pos) = narratives.iter().position(|n| n.id == id) {
        &mut narratives[pos]
    } else {
        narratives.push(CodedNarrative {
            id,
            ..CodedNarrative::default()
        });
        narratives.last_mut().expect("just pushed")
    }
}

fn record_note(hit: &ColumnMatch, wanted: &str, warnings: &mut Vec<String>) {
    if let Some(note) = hit.substitution_note(wanted) {
        warnings.push(note);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|h| h.to_string()).collect()
    }

    fn prefix_headers() -> Vec<String> {
        headers(&[
            "Date",
            "Publication",
            "Outlet score",
            "Body - Length - Words",
            "Topic_Prominence",
            "Topic_Sentiment",
            "Narrative_Performance_Prominence",
            "Narrative_Performance_Sentiment",
            "Narrative_Fun_Prominence",
            "Narrative_Fun_Sentiment",
            "Enity_BMW_Prominence",
            "Entity_BMW_Sentiment",
            "Entity_BMW_Quality_Score",
            "Entity_BMW_State",
            "Entity_BMW_Modifier",
            "Entity_Audi_Prominence",
            "Entity_Audi_Sentiment",
            "Entity_Audi_Quality_score",
            "Entity_Audi_Modifiers",
        ])
    }

    #[test]
    fn test_prefix_dialect_resolution() {
        let schema = SchemaResolver::new().resolve(&prefix_headers()).unwrap();

        assert_eq!(schema.dialect, HeaderDialect::Prefix);
        assert_eq!(schema.topic_prominence, "Topic_Prominence");
        assert_eq!(schema.outlet_tier, "Outlet score");
        assert_eq!(schema.date.as_deref(), Some("Date"));

        assert_eq!(schema.entities.len(), 2);
        let bmw = &schema.entities[0];
        assert_eq!(bmw.key, "BMW");
        assert_eq!(bmw.prominence, "Enity_BMW_Prominence");
        assert_eq!(bmw.state.as_deref(), Some("Entity_BMW_State"));

        let audi = &schema.entities[1];
        assert_eq!(audi.quality_score.as_deref(), Some("Entity_Audi_Quality_score"));
        assert_eq!(audi.modifier.as_deref(), Some("Entity_Audi_Modifiers"));
        assert!(audi.state.is_none());

        // Narrative tie precedence is discovery order
        let keys: Vec<&str> = schema.narratives.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, ["Performance", "Fun"]);

        // Both tolerated headers show up as warnings
        assert!(schema.warnings.iter().any(|w| w.contains("Enity_BMW_Prominence")));
    }

    #[test]
    fn test_super_prominence_preferred() {
        let schema = SchemaResolver::new()
            .resolve(&headers(&[
                "Outlet score",
                "Topic_Prominence",
                "Topic_Sentiment",
                "Entity_Acme_Prominence",
                "Entity_Acme_Super_Prominence",
                "Entity_Acme_Sentiment",
            ]))
            .unwrap();
        assert_eq!(schema.entities[0].prominence, "Entity_Acme_Super_Prominence");
    }

    #[test]
    fn test_coded_dialect_resolution() {
        let schema = SchemaResolver::new()
            .resolve(&headers(&[
                "Date",
                "Publication",
                "Orchestra_Pub_Tier",
                "O_Overall - Overall-Level Prominence",
                "O_Overall - Overall-Level Sentiment",
                "O_M_1prom",
                "O_M_1sent",
                "O_Overall - Message 2 Prominence (Pricing pressure)",
                "O_Overall - Message 2 Sentiment (Pricing pressure)",
                "1_Tesla - Company-Level Prominence",
                "1_Tesla - Company-Level Sentiment",
                "1_Orchestra_Quality_Score",
                "1_C_State",
                "1_C_Modifier",
                "2_C_Prom",
                "2_C_Sent",
            ]))
            .unwrap();

        assert_eq!(schema.dialect, HeaderDialect::Coded);
        assert_eq!(schema.outlet_tier, "Orchestra_Pub_Tier");
        assert_eq!(schema.topic_prominence, "O_Overall - Overall-Level Prominence");

        assert_eq!(schema.entities.len(), 2);
        let tesla = &schema.entities[0];
        assert_eq!(tesla.key, "Tesla");
        assert_eq!(tesla.prominence, "1_Tesla - Company-Level Prominence");
        assert_eq!(tesla.quality_score.as_deref(), Some("1_Orchestra_Quality_Score"));
        assert_eq!(tesla.state.as_deref(), Some("1_C_State"));
        let second = &schema.entities[1];
        assert_eq!(second.key, "2");
        assert_eq!(second.prominence, "2_C_Prom");

        assert_eq!(schema.narratives.len(), 2);
        assert_eq!(schema.narratives[0].key, "Message_1");
        assert_eq!(schema.narratives[0].prominence, "O_M_1prom");
        assert_eq!(schema.narratives[1].key, "Message_2");
        assert_eq!(
            schema.narratives[1].description.as_deref(),
            Some("Pricing pressure")
        );
    }

    #[test]
    fn test_topic_fallback_to_first_entity() {
        let schema = SchemaResolver::new()
            .resolve(&headers(&[
                "Outlet score",
                "Entity_Acme_Prominence",
                "Entity_Acme_Sentiment",
            ]))
            .unwrap();
        assert_eq!(schema.topic_prominence, "Entity_Acme_Prominence");
        assert_eq!(schema.topic_sentiment, "Entity_Acme_Sentiment");
        assert_eq!(schema.warnings.len(), 2);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = SchemaResolver::new()
            .resolve(&headers(&["Date", "Publication", "Body - Length - Words"]))
            .unwrap_err();
        let SchemaError::MissingFields { missing, available } = err else {
            panic!("expected MissingFields");
        };
        assert!(missing.iter().any(|m| m.contains("topic prominence")));
        assert!(missing.iter().any(|m| m.contains("outlet tier")));
        assert_eq!(available.len(), 3);
    }

    #[test]
    fn test_misspelled_state_column_does_not_bind() {
        let schema = SchemaResolver::new()
            .resolve(&headers(&[
                "Outlet score",
                "Topic_Prominence",
                "Topic_Sentiment",
                "Entity_X_Prominence",
                "Entity_X_Sentiment",
                "Entity_X__State",
            ]))
            .unwrap();
        assert!(schema.entities[0].state.is_none());
    }

    #[test]
    fn test_partially_bound_entity_dropped_with_warning() {
        let schema = SchemaResolver::new()
            .resolve(&headers(&[
                "Outlet score",
                "Topic_Prominence",
                "Topic_Sentiment",
                "Entity_Acme_Prominence",
                "Entity_Acme_Sentiment",
                "Entity_Ghost_Prominence",
            ]))
            .unwrap();
        assert_eq!(schema.entities.len(), 1);
        assert!(schema.warnings.iter().any(|w| w.contains("Ghost")));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = SchemaResolver::new().resolve(&prefix_headers()).unwrap();
        let second = SchemaResolver::new().resolve(&prefix_headers()).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
