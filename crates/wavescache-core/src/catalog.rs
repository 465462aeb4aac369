//! Entity name registry.
//!
//! Maps the display names users type onto entity ids. Names from the user's
//! own cached entity list take precedence over the built-in table.

use crate::models::EntitySummary;

/// Built-in name → entity id table.
const ENTITY_NAMES: &[(&str, i64)] = &[
    ("今汐", 1101),
    ("维里奈", 1201),
    ("白芷", 1202),
    ("炽霞", 1301),
    ("安可", 1303),
    ("吟霖", 1402),
    ("忌炎", 1403),
    ("卡卡罗", 1501),
    ("椿", 1502),
    ("长离", 1503),
    ("莫特斐", 1504),
    ("莉维娅", 1505),
    ("鸣徽", 1506),
    ("凌阳", 1601),
    ("相里要", 1602),
];

/// Strip surrounding whitespace and any ASCII or full-width spaces.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|&c| c != ' ' && c != '\u{3000}')
        .collect()
}

pub fn lookup_builtin(name: &str) -> Option<i64> {
    let normalized = normalize_name(name);
    ENTITY_NAMES
        .iter()
        .find(|(n, _)| *n == normalized)
        .map(|&(_, id)| id)
}

pub fn builtin_name(entity_id: i64) -> Option<&'static str> {
    ENTITY_NAMES
        .iter()
        .find(|&&(_, id)| id == entity_id)
        .map(|&(n, _)| n)
}

/// Resolve a name against the known entity list, the built-in table, and
/// finally as a numeric id literal.
pub fn resolve_entity_id(name: &str, known: &[EntitySummary]) -> Option<i64> {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }

    known
        .iter()
        .find(|e| normalize_name(&e.name) == normalized)
        .map(|e| e.entity_id)
        .or_else(|| lookup_builtin(&normalized))
        .or_else(|| normalized.parse::<i64>().ok().filter(|id| *id > 0))
}

/// Display label for an entity, falling back to its id.
pub fn label(entity_id: i64, known: &[EntitySummary]) -> String {
    known
        .iter()
        .find(|e| e.entity_id == entity_id && !e.name.is_empty())
        .map(|e| e.name.clone())
        .or_else(|| builtin_name(entity_id).map(str::to_string))
        .unwrap_or_else(|| format!("ID:{}", entity_id))
}
