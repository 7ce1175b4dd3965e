use clap::{Args, Parser, Subcommand};
use shotsync::hierarchy::{SequenceItem, TrackItem};
use shotsync_common::{EntityRef, FieldValue, ScopeFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shotsync")]
#[command(author, version, about = "Shot tracking lookups for compositing pipelines")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The track item to work on.
#[derive(Args, Debug, Clone)]
pub struct ShotArgs {
    /// Shot (track item) name
    #[arg(long)]
    pub shot: String,

    /// Editorial sequence name
    #[arg(long)]
    pub sequence: String,

    /// Tag on the sequence (repeatable); one must name the episode
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Source media, used for thumbnails
    #[arg(long)]
    pub source: Option<String>,
}

impl ShotArgs {
    pub fn track_item(&self) -> TrackItem {
        let sequence = self
            .tags
            .iter()
            .fold(SequenceItem::new(self.sequence.as_str()), |seq, tag| {
                seq.with_tag(tag.as_str())
            });
        let mut item = TrackItem::new(self.shot.as_str(), sequence);
        item.source = self.source.clone();
        item
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find or create a single entity by natural key
    Resolve {
        /// Entity type, e.g. Shot
        entity_type: String,

        /// Entity code
        code: String,

        /// Scope filter `field=value` or `field!=value`; `Type#id` values link to an entity
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<ScopeFilter>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a shot with its sequence and episode
    Shot {
        #[command(flatten)]
        item: ShotArgs,

        /// Skip thumbnail upload for new entities
        #[arg(long)]
        no_thumbnails: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a single `{keyword}` for a shot
    Keyword {
        /// Keyword including braces, e.g. "{code}"
        keyword: String,

        #[command(flatten)]
        item: ShotArgs,
    },

    /// Fill every `{keyword}` in a naming template
    Template {
        /// Template, e.g. "{Episode}/{code}_comp_v001"
        template: String,

        #[command(flatten)]
        item: ShotArgs,
    },

    /// Apply a shot's cut range to a script root saved as JSON
    Frames {
        #[command(flatten)]
        item: ShotArgs,

        /// Script root file; created when missing
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Parse `field=value` / `field!=value` into a filter.
pub fn parse_filter(s: &str) -> Result<ScopeFilter, String> {
    let (field, value, negate) = if let Some((field, value)) = s.split_once("!=") {
        (field, value, true)
    } else if let Some((field, value)) = s.split_once('=') {
        (field, value, false)
    } else {
        return Err(format!("expected field=value, got '{s}'"));
    };

    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }

    let value = parse_value(value.trim());
    Ok(if negate {
        ScopeFilter::is_not(field, value)
    } else {
        ScopeFilter::is(field, value)
    })
}

fn parse_value(s: &str) -> FieldValue {
    if let Some((entity_type, id)) = s.split_once('#') {
        if let Ok(id) = id.parse::<i64>() {
            if !entity_type.is_empty() {
                return FieldValue::from(EntityRef::new(entity_type, id));
            }
        }
    }
    match s {
        "" | "null" => FieldValue::Null,
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ => s
            .parse::<i64>()
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Text(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shotsync_common::Relation;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_entity_filters() {
        let f = parse_filter("project=Project#65").unwrap();
        assert_eq!(f.field, "project");
        assert_eq!(f.relation, Relation::Is);
        assert_eq!(f.value, FieldValue::from(EntityRef::new("Project", 65)));
    }

    #[test]
    fn parses_plain_values() {
        assert_eq!(parse_filter("sg_cut_in=1001").unwrap().value, FieldValue::Int(1001));
        assert_eq!(
            parse_filter("code=SH#A").unwrap().value,
            FieldValue::Text("SH#A".to_string())
        );
        let f = parse_filter("status!=omt").unwrap();
        assert_eq!(f.relation, Relation::IsNot);
        assert_eq!(f.value, FieldValue::Text("omt".to_string()));
    }

    #[test]
    fn rejects_malformed_filters() {
        assert!(parse_filter("project").is_err());
        assert!(parse_filter("=5").is_err());
    }

    #[test]
    fn builds_track_item() {
        let cli = Cli::parse_from([
            "shotsync", "keyword", "{code}", "--shot", "SH010", "--sequence", "SEQ01", "--tag",
            "FER_101",
        ]);
        let Commands::Keyword { keyword, item } = cli.command else {
            panic!("expected keyword command");
        };
        assert_eq!(keyword, "{code}");
        let item = item.track_item();
        assert_eq!(item.name, "SH010");
        assert_eq!(item.sequence.tags[0].name, "FER_101");
    }
}
