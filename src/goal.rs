//! Goal configuration: the declarative description of each tracked goal.
//!
//! Goals live in `_data/goals.yml` under a `goals:` mapping keyed by id.
//! Declaration order is preserved because the daily check-in breaks priority
//! ties by it.

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::ConfigError;

/// How "current position" within a goal's content advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Progression {
    /// Items are worked through in sorted order.
    Sequential,
    /// The current item is derived from weeks elapsed since `start`.
    TimeWeekly,
    /// Items are done in any order; only counts matter.
    Unordered,
    /// No computed position.
    #[default]
    None,
}

impl Progression {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::TimeWeekly => "time-weekly",
            Self::Unordered => "unordered",
            Self::None => "none",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Some(Self::Sequential),
            "time-weekly" | "time_weekly" => Some(Self::TimeWeekly),
            "unordered" => Some(Self::Unordered),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }
}

impl From<String> for Progression {
    fn from(s: String) -> Self {
        Self::from_label(&s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unrecognized progression, treating as none");
            Self::None
        })
    }
}

impl From<Progression> for String {
    fn from(p: Progression) -> Self {
        p.as_label().to_string()
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Expected logging frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cadence {
    Daily,
    Weekly,
    EveryTwoWeeks,
    #[default]
    None,
}

impl Cadence {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::EveryTwoWeeks => "every_2_weeks",
            Self::None => "none",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "every_2_weeks" | "biweekly" => Some(Self::EveryTwoWeeks),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }
}

impl From<String> for Cadence {
    fn from(s: String) -> Self {
        Self::from_label(&s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unrecognized cadence, treating as none");
            Self::None
        })
    }
}

impl From<Cadence> for String {
    fn from(c: Cadence) -> Self {
        c.as_label().to_string()
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Explicitly requested urgency policy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyKind {
    None,
    Daily,
    Weekly,
    Biweekly,
    Target,
    Stale,
    /// Anything else; inference proceeds as if no type were given.
    Unrecognized,
}

impl PolicyKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Target => "target",
            Self::Stale => "stale",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl From<String> for PolicyKind {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "none" => Self::None,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "biweekly" | "every_2_weeks" => Self::Biweekly,
            "target" => Self::Target,
            "stale" => Self::Stale,
            _ => {
                tracing::warn!(value = %s, "unrecognized urgency type, inferring from cadence");
                Self::Unrecognized
            }
        }
    }
}

impl From<PolicyKind> for String {
    fn from(k: PolicyKind) -> Self {
        k.as_label().to_string()
    }
}

/// Accumulation window for target policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetPeriod {
    /// Monday of the current week through today.
    #[default]
    Weekly,
    /// Today only.
    Daily,
}

impl From<String> for TargetPeriod {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("weekly") {
            Self::Weekly
        } else {
            Self::Daily
        }
    }
}

impl From<TargetPeriod> for String {
    fn from(p: TargetPeriod) -> Self {
        match p {
            TargetPeriod::Weekly => "weekly".into(),
            TargetPeriod::Daily => "daily".into(),
        }
    }
}

/// The optional `urgency:` block of a goal. Every field overrides the
/// default inferred from cadence/progression. A field of the wrong type is
/// dropped with a warning so its default applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrgencySpec {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<PolicyKind>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub due_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub nag_from: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label", skip_serializing_if = "Option::is_none")]
    pub period: Option<TargetPeriod>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub warn_at: Option<f64>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub under_is_good: Option<bool>,
    #[serde(default, deserialize_with = "lenient_days", skip_serializing_if = "Option::is_none")]
    pub stale_days: Option<i64>,
    #[serde(default, deserialize_with = "lenient_days", skip_serializing_if = "Option::is_none")]
    pub overdue_days: Option<i64>,
}

/// Static configuration of one goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Unique key; taken from the `goals:` mapping key.
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_aliases")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "label_or_default")]
    pub progression: Progression,
    #[serde(default, deserialize_with = "label_or_default")]
    pub cadence: Cadence,
    /// Content root relative to the repository.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Display unit for numeric logs (e.g. "min").
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_block", skip_serializing_if = "Option::is_none")]
    pub urgency: Option<UrgencySpec>,
    #[serde(
        default,
        deserialize_with = "crate::clock::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<NaiveDate>,
}

impl GoalConfig {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn unit_label(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    /// Configuration problems that degrade behaviour without failing.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.progression == Progression::TimeWeekly && self.start.is_none() {
            warnings.push(format!(
                "{}: time-weekly progression without `start`; week stays at 1",
                self.id
            ));
        }
        if self.progression != Progression::None && self.content.is_none() {
            warnings.push(format!(
                "{}: {} progression without `content`; position is empty",
                self.id, self.progression
            ));
        }
        warnings
    }
}

/// All configured goals, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct GoalBook {
    goals: Vec<GoalConfig>,
}

#[derive(Deserialize)]
struct GoalsFile {
    #[serde(default)]
    goals: serde_yaml::Mapping,
}

impl GoalBook {
    pub fn new(goals: Vec<GoalConfig>) -> Self {
        Self { goals }
    }

    /// Parse the contents of `goals.yml`. Badly typed fields fall back to
    /// their defaults; a goal that is not a mapping at all is skipped with a
    /// warning; an unparseable document is an error.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if crate::store::is_blank_yaml(text) {
            return Ok(Self::default());
        }
        let file: Option<GoalsFile> = serde_yaml::from_str(text)?;
        let Some(file) = file else {
            return Ok(Self::default());
        };

        let mut goals = Vec::with_capacity(file.goals.len());
        for (key, value) in file.goals {
            let Some(id) = key.as_str().map(str::to_string) else {
                tracing::warn!(key = ?key, "skipping goal with non-string id");
                continue;
            };
            // `id:` with nothing under it is a goal with every default.
            let value = match value {
                Value::Null => Value::Mapping(serde_yaml::Mapping::new()),
                other => other,
            };
            match serde_yaml::from_value::<GoalConfig>(value) {
                Ok(mut goal) => {
                    if goal.name.is_empty() {
                        goal.name = id.clone();
                    }
                    goal.id = id;
                    for warning in goal.validate() {
                        tracing::warn!("{warning}");
                    }
                    goals.push(goal);
                }
                Err(e) => tracing::warn!(goal = %id, error = %e, "skipping malformed goal"),
            }
        }
        Ok(Self { goals })
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoalConfig> {
        self.goals.iter()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GoalConfig> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.goals.iter().map(|g| g.id.as_str()).collect()
    }

    /// Fuzzy lookup: id, then alias, then display name, all case-insensitive.
    pub fn resolve(&self, input: &str) -> Option<&GoalConfig> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(goal) = self.goals.iter().find(|g| g.id.to_lowercase() == needle) {
            return Some(goal);
        }
        self.goals.iter().find(|g| {
            g.aliases.iter().any(|a| a.to_lowercase() == needle)
                || g.name.to_lowercase() == needle
        })
    }

    /// Like `resolve`, but reports the available ids on failure.
    pub fn require(&self, input: &str) -> Result<&GoalConfig, ConfigError> {
        self.resolve(input).ok_or_else(|| ConfigError::UnknownGoal {
            input: input.to_string(),
            available: self.ids().join(", "),
        })
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn ignored<T>(value: &Value, expected: &str) -> Option<T> {
    tracing::warn!(value = ?value, "expected {expected}, using default");
    None
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => ignored(&other, "a string"),
    })
}

fn lenient_name<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        other => scalar_text(other).or_else(|| ignored(other, "a name")),
    }
    .unwrap_or_default())
}

fn lenient_aliases<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| scalar_text(item).or_else(|| ignored(item, "an alias")))
            .collect(),
        other => scalar_text(other)
            .or_else(|| ignored(other, "a list of aliases"))
            .into_iter()
            .collect(),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().or_else(|| ignored(&value, "a number")),
        other => ignored(other, "a number"),
    })
}

fn lenient_days<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .or_else(|| ignored(&value, "a whole number of days")),
        Value::String(s) => s
            .trim()
            .parse()
            .ok()
            .or_else(|| ignored(&value, "a whole number of days")),
        other => ignored(other, "a whole number of days"),
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => ignored(&value, "true or false"),
        },
        other => ignored(other, "true or false"),
    })
}

/// Enum labels: any scalar goes through the enum's own `From<String>`,
/// which warns on unknown labels.
fn lenient_label<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        other => scalar_text(other)
            .map(T::from)
            .or_else(|| ignored(other, "a label")),
    })
}

fn label_or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    Ok(lenient_label(d)?.unwrap_or_default())
}

fn lenient_block<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(match &value {
        Value::Null => None,
        Value::Mapping(_) => match serde_yaml::from_value(value.clone()) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed block");
                None
            }
        },
        other => ignored(other, "a mapping"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOALS: &str = r#"
goals:
  hindi:
    name: Hindi
    aliases: [hi, language]
    progression: sequential
    content: hindi/chapters
  fitness:
    name: Fitness
    cadence: weekly
    unit: min
    target: 150
  calendar:
    name: Calendaring
    cadence: daily
    progression: time-weekly
    start: 2026-01-01
    urgency:
      nag_from: "09:00"
  stretch:
    progression: freeform
    cadence: fortnightly
"#;

    #[test]
    fn parses_goals_in_declaration_order() {
        let book = GoalBook::from_yaml(GOALS).unwrap();
        assert_eq!(book.ids(), vec!["hindi", "fitness", "calendar", "stretch"]);

        let calendar = book.get("calendar").unwrap();
        assert_eq!(calendar.progression, Progression::TimeWeekly);
        assert_eq!(calendar.cadence, Cadence::Daily);
        assert_eq!(calendar.start, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(
            calendar.urgency.as_ref().unwrap().nag_from.as_deref(),
            Some("09:00")
        );

        let fitness = book.get("fitness").unwrap();
        assert_eq!(fitness.target, Some(150.0));
        assert_eq!(fitness.unit_label(), "min");
    }

    #[test]
    fn unknown_enums_fall_back_to_none() {
        let book = GoalBook::from_yaml(GOALS).unwrap();
        let stretch = book.get("stretch").unwrap();
        assert_eq!(stretch.progression, Progression::None);
        assert_eq!(stretch.cadence, Cadence::None);
        assert_eq!(stretch.display_name(), "stretch");
    }

    #[test]
    fn resolve_matches_id_alias_and_name() {
        let book = GoalBook::from_yaml(GOALS).unwrap();
        assert_eq!(book.resolve("HINDI").unwrap().id, "hindi");
        assert_eq!(book.resolve("hi").unwrap().id, "hindi");
        assert_eq!(book.resolve("calendaring").unwrap().id, "calendar");
        assert!(book.resolve("spanish").is_none());
        assert!(matches!(
            book.require("spanish"),
            Err(ConfigError::UnknownGoal { .. })
        ));
    }

    #[test]
    fn empty_document_is_empty_book() {
        assert!(GoalBook::from_yaml("").unwrap().is_empty());
        assert!(GoalBook::from_yaml("# only comments\n").unwrap().is_empty());
    }

    #[test]
    fn validate_flags_time_weekly_without_start() {
        let mut goal = GoalConfig::new("cal");
        goal.progression = Progression::TimeWeekly;
        goal.content = Some("cal".into());
        assert_eq!(goal.validate().len(), 1);
        goal.start = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert!(goal.validate().is_empty());
    }

    #[test]
    fn badly_typed_fields_fall_back_to_defaults() {
        use crate::urgency::{
            DEFAULT_DUE_BY, DEFAULT_NAG_FROM, DEFAULT_OVERDUE_DAYS, DEFAULT_STALE_DAYS,
            UrgencyPolicy,
        };

        let book = GoalBook::from_yaml(
            r#"
goals:
  journal:
    name: Journal
    cadence: daily
    urgency:
      due_by: 2359
  fitness:
    name: Fitness
    aliases: gym
    cadence: weekly
    unit: min
    target: "150"
  hindi:
    progression: sequential
    content: hindi
    urgency:
      type: stale
      stale_days: five
  reading:
"#,
        )
        .unwrap();
        assert_eq!(book.ids(), vec!["journal", "fitness", "hindi", "reading"]);

        let journal = book.get("journal").unwrap();
        assert_eq!(journal.urgency.as_ref().unwrap().due_by, None);
        assert_eq!(
            UrgencyPolicy::for_goal(journal),
            UrgencyPolicy::Daily {
                due_by: DEFAULT_DUE_BY,
                nag_from: DEFAULT_NAG_FROM,
            }
        );

        let fitness = book.get("fitness").unwrap();
        assert_eq!(fitness.target, Some(150.0));
        assert_eq!(fitness.aliases, vec!["gym"]);
        assert_eq!(book.resolve("gym").unwrap().id, "fitness");

        let hindi = book.get("hindi").unwrap();
        assert_eq!(
            UrgencyPolicy::for_goal(hindi),
            UrgencyPolicy::Stale {
                stale_days: DEFAULT_STALE_DAYS,
                overdue_days: DEFAULT_OVERDUE_DAYS,
            }
        );

        assert_eq!(book.get("reading").unwrap().display_name(), "reading");
    }

    #[test]
    fn non_mapping_blocks_are_ignored() {
        let book = GoalBook::from_yaml(
            r#"
goals:
  stretch:
    cadence: 7
    urgency: daily
    under: [1, 2]
"#,
        )
        .unwrap();
        let stretch = book.get("stretch").unwrap();
        assert_eq!(stretch.cadence, Cadence::None);
        assert!(stretch.urgency.is_none());
    }
}
