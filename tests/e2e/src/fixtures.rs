//! Synthetic coverage tables for end-to-end scenarios.
//!
//! One tracked narrative (`Momentum`) and three tracked entities (`Acme`,
//! `Borealis`, `Cascade`) in the prefix header dialect. Rows default to an
//! empty article; builder methods fill in the subjects a scenario needs.

use resonance_core::Table;

/// One synthetic article row.
#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub date: String,
    pub publication: String,
    pub outlet: f64,
    pub topic: (f64, f64),
    pub narrative: (f64, f64),
    pub acme: (f64, f64),
    pub borealis: (f64, f64),
    pub cascade: (f64, f64),
    pub acme_quality: Option<f64>,
    pub acme_modifier: Option<String>,
}

impl ArticleRow {
    /// An empty article on the given date.
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            publication: "Daily Herald".to_string(),
            outlet: 3.0,
            topic: (0.0, 0.0),
            narrative: (0.0, 0.0),
            acme: (0.0, 0.0),
            borealis: (0.0, 0.0),
            cascade: (0.0, 0.0),
            acme_quality: None,
            acme_modifier: None,
        }
    }

    pub fn publication(mut self, publication: &str) -> Self {
        self.publication = publication.to_string();
        self
    }

    pub fn outlet(mut self, outlet: f64) -> Self {
        self.outlet = outlet;
        self
    }

    pub fn topic(mut self, prominence: f64, sentiment: f64) -> Self {
        self.topic = (prominence, sentiment);
        self
    }

    pub fn narrative(mut self, prominence: f64, sentiment: f64) -> Self {
        self.narrative = (prominence, sentiment);
        self
    }

    pub fn acme(mut self, prominence: f64, sentiment: f64) -> Self {
        self.acme = (prominence, sentiment);
        self
    }

    pub fn borealis(mut self, prominence: f64, sentiment: f64) -> Self {
        self.borealis = (prominence, sentiment);
        self
    }

    pub fn cascade(mut self, prominence: f64, sentiment: f64) -> Self {
        self.cascade = (prominence, sentiment);
        self
    }

    pub fn acme_quality(mut self, quality: f64) -> Self {
        self.acme_quality = Some(quality);
        self
    }

    pub fn acme_modifier(mut self, modifier: &str) -> Self {
        self.acme_modifier = Some(modifier.to_string());
        self
    }
}

/// The standard prefix-dialect header row.
pub fn header() -> String {
    "Date,Publication,Outlet score,Topic_Prominence,Topic_Sentiment,\
     Narrative_Momentum_Prominence,Narrative_Momentum_Sentiment,\
     Entity_Acme_Prominence,Entity_Acme_Sentiment,Entity_Acme_Quality_Score,Entity_Acme_Modifier,\
     Entity_Borealis_Prominence,Entity_Borealis_Sentiment,\
     Entity_Cascade_Prominence,Entity_Cascade_Sentiment"
        .to_string()
}

/// Render rows under the standard header.
pub fn render(rows: &[ArticleRow]) -> String {
    let mut csv = header();
    csv.push('\n');
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            row.date,
            row.publication,
            row.outlet,
            row.topic.0,
            row.topic.1,
            row.narrative.0,
            row.narrative.1,
            row.acme.0,
            row.acme.1,
            row.acme_quality.map(|q| q.to_string()).unwrap_or_default(),
            row.acme_modifier.clone().unwrap_or_default(),
            row.borealis.0,
            row.borealis.1,
            row.cascade.0,
            row.cascade.1,
        ));
    }
    csv
}

/// Build a table from rows under the standard header.
pub fn table(rows: &[ArticleRow]) -> Table {
    Table::from_reader(render(rows).as_bytes()).expect("fixture table parses")
}
