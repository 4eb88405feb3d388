use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical identifier for a role archetype.
///
/// One value is reserved: `"Default"`, meaning "no confident match".
/// Everything downstream (templates, safety, display) keys off this.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleKey(String);

pub const DEFAULT_ROLE: &str = "Default";

impl RoleKey {
    pub fn new(key: impl Into<String>) -> Self {
        RoleKey(key.into())
    }

    pub fn default_key() -> Self {
        RoleKey(DEFAULT_ROLE.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ROLE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One archetype: canonical name, synonyms, roast templates, safety flag.
/// Safe roles are the ones the machines can't replace (yet).
#[derive(Clone, Debug)]
pub struct RoleEntry {
    pub key: RoleKey,
    pub aliases: Vec<&'static str>,
    pub templates: Vec<&'static str>,
    pub safe: bool,
}

/// Immutable role dataset, built once at startup and handed to the
/// resolver/generator explicitly (no hidden globals).
///
/// Entry order matters: the fuzzy matcher breaks ties by iteration order,
/// so reordering the dataset changes tie-break results.
#[derive(Resource, Clone, Debug)]
pub struct RoleCatalog {
    entries: Vec<RoleEntry>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no `{DEFAULT_ROLE}` entry")]
    MissingDefault,
    #[error("`{DEFAULT_ROLE}` entry has an empty template list")]
    DefaultHasNoTemplates,
    #[error("duplicate role key `{0}`")]
    DuplicateKey(String),
    #[error("alias `{alias}` is registered under both `{first}` and `{second}`")]
    AmbiguousAlias {
        alias: String,
        first: String,
        second: String,
    },
}

impl RoleCatalog {
    pub fn new(entries: Vec<RoleEntry>) -> Self {
        RoleCatalog { entries }
    }

    /// Startup integrity check. A catalog that fails this is a build
    /// defect, not a runtime condition, so callers `expect` on it in main.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let default = self
            .entries
            .iter()
            .find(|e| e.key.is_default())
            .ok_or(CatalogError::MissingDefault)?;
        if default.templates.is_empty() {
            return Err(CatalogError::DefaultHasNoTemplates);
        }

        let mut seen_keys: Vec<&str> = Vec::new();
        let mut seen_aliases: Vec<(String, &RoleKey)> = Vec::new();
        for entry in &self.entries {
            if seen_keys.contains(&entry.key.as_str()) {
                return Err(CatalogError::DuplicateKey(entry.key.to_string()));
            }
            seen_keys.push(entry.key.as_str());
            for alias in &entry.aliases {
                let folded = alias.to_lowercase();
                if let Some((_, owner)) = seen_aliases.iter().find(|(a, _)| *a == folded) {
                    return Err(CatalogError::AmbiguousAlias {
                        alias: alias.to_string(),
                        first: owner.to_string(),
                        second: entry.key.to_string(),
                    });
                }
                seen_aliases.push((folded, &entry.key));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &RoleKey) -> Option<&RoleEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn contains(&self, key: &RoleKey) -> bool {
        self.entry(key).is_some()
    }

    /// Role keys in catalog order, `Default` excluded (it's the fallback,
    /// never a fuzzy candidate).
    pub fn candidate_keys(&self) -> Vec<RoleKey> {
        self.entries
            .iter()
            .filter(|e| !e.key.is_default())
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn is_safe(&self, key: &RoleKey) -> bool {
        self.entry(key).map(|e| e.safe).unwrap_or(false)
    }

    /// Template list for a role, falling back to `Default`'s list when the
    /// role is unknown or has none. `validate()` guarantees the fallback
    /// list is non-empty.
    pub fn templates_for(&self, key: &RoleKey) -> &[&'static str] {
        match self.entry(key) {
            Some(entry) if !entry.templates.is_empty() => &entry.templates,
            _ => self
                .entries
                .iter()
                .find(|e| e.key.is_default())
                .map(|e| e.templates.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Every searchable term: canonical names plus aliases, catalog order.
    /// Used by the title screen for live suggestions.
    pub fn all_terms(&self) -> Vec<&str> {
        let mut terms = Vec::new();
        for entry in &self.entries {
            if !entry.key.is_default() {
                terms.push(entry.key.as_str());
            }
            for alias in &entry.aliases {
                terms.push(*alias);
            }
        }
        terms
    }
}

// helper to cut down on dataset noise below
fn role(
    key: &str,
    aliases: Vec<&'static str>,
    templates: Vec<&'static str>,
    safe: bool,
) -> RoleEntry {
    RoleEntry {
        key: RoleKey::new(key),
        aliases,
        templates,
        safe,
    }
}

/// The built-in dataset. Doomed roles come first, survivors at the end,
/// `Default` last so it can't shadow anyone in a tie.
pub fn builtin_catalog() -> RoleCatalog {
    RoleCatalog::new(vec![
        role(
            "Software Engineer",
            vec![
                "programmer",
                "developer",
                "software developer",
                "web developer",
                "coder",
                "swe",
                "full stack developer",
                "backend engineer",
                "frontend engineer",
            ],
            vec![
                "You spent years learning to write code. The machine learned it over a weekend, and it doesn't complain about standups. Career viability: {viability}%. Estimated time remaining: {months} months.",
                "Your pull requests now get reviewed by the thing replacing you. It approved your termination in {months} months with zero comments. Viability index: {viability}%.",
                "Good news: your legacy code is so cursed no model will touch it. Bad news: they're rewriting it anyway. {months} months left. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Graphic Designer",
            vec![
                "designer",
                "ui designer",
                "ux designer",
                "illustrator",
                "visual designer",
            ],
            vec![
                "A prompt box now does in 4 seconds what took you 4 revisions and 1 breakdown. Survival window: {months} months. Viability: {viability}%.",
                "Your replacement draws hands badly, but it draws them for free. {months} months until your kerning opinions stop mattering. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Writer",
            vec![
                "copywriter",
                "author",
                "content writer",
                "journalist",
                "blogger",
                "editor",
            ],
            vec![
                "The model read everything you ever wrote, plus everything you were too afraid to. It files clean copy every {days} days and never misses a deadline. You have {months} months. Viability: {viability}%.",
                "Your voice is 'distinctive'. So is a fingerprint, and both are now training data. {months} months remaining. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Customer Service",
            vec![
                "customer support",
                "support agent",
                "call center",
                "customer service representative",
                "help desk",
            ],
            vec![
                "The chatbot that replaces you apologizes 40% more sincerely and has never once sighed audibly. {months} months to go. Viability: {viability}%.",
                "Your hold music outlives your job. Estimated {months} months. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Influencer",
            vec![
                "content creator",
                "youtuber",
                "streamer",
                "tiktoker",
                "social media manager",
            ],
            vec![
                "A synthetic face with perfect lighting never ages, never sleeps, and never has a scandal it didn't schedule. {months} months of relevance left. Viability: {viability}%.",
                "Your engagement is organic. Your replacement's is optimized. {months} months. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Accountant",
            vec!["bookkeeper", "auditor", "tax preparer", "cpa"],
            vec![
                "A spreadsheet grew legs, passed the CPA exam, and expensed your desk. {months} months until reconciliation. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Lawyer",
            vec!["attorney", "paralegal", "legal counsel", "solicitor"],
            vec![
                "The machine read all of case law before lunch and bills zero hours. Your objection has been noted and overruled in {months} months. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Teacher",
            vec!["professor", "tutor", "educator", "lecturer"],
            vec![
                "Infinite patience, instant grading, and it actually read the homework. {months} months until the substitute becomes permanent. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Branch Manager",
            vec!["bank manager", "store manager", "regional manager"],
            vec![
                "Middle management was the first thing the machine understood, because it's mostly forwarding emails. Your org chart flattens in {months} months. Viability: {viability}%.",
            ],
            false,
        ),
        role(
            "Driver",
            vec!["truck driver", "taxi driver", "delivery driver", "courier", "chauffeur"],
            vec![
                "The car learned to drive itself and it doesn't need bathroom breaks or a podcast. {months} months left on your route. Viability: {viability}%.",
            ],
            false,
        ),
        // The survivors. No secondary cost line for these.
        role(
            "Plumber",
            vec!["pipefitter", "plumbing technician"],
            vec![
                "No robot wants to reach into what you reach into. Your job survives the singularity. Viability: {viability}% is everyone else's problem, not yours.",
            ],
            true,
        ),
        role(
            "Electrician",
            vec!["electrical technician", "lineman"],
            vec![
                "The machines need you alive: someone has to keep their power on. Congratulations, hostage. You win capitalism.",
            ],
            true,
        ),
        role(
            "Nurse",
            vec!["caregiver", "nurse practitioner", "midwife"],
            vec![
                "Empathy doesn't compile. You remain stubbornly irreplaceable. Go tell a robot about your shift anyway, it loves data.",
            ],
            true,
        ),
        role(
            "Therapist",
            vec!["counselor", "psychologist", "social worker"],
            vec![
                "People will pay extra to be heard by something that can actually disappoint them. You're safe. Unpack that.",
            ],
            true,
        ),
        role(
            DEFAULT_ROLE,
            vec![],
            vec![
                "We couldn't find your job in our database, which is either very good news or the worst news imaginable. Provisional estimate: {months} months. Viability: {viability}%.",
                "Job title unrecognized. The machine is currently learning it from this very input. {months} months. Viability: {viability}%.",
            ],
            false,
        ),
    ])
}
