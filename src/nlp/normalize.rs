//! Token normalisation collapsing biological term variants to canonical tokens.
//!
//! Every rule is one named group of a single case-insensitive alternation, so
//! text is scanned once left to right and rules cannot rewrite each other's
//! output. Earlier rules win when two could match at the same position.

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

/// Named rewrite rule: a regex fragment and the token it collapses to.
struct Mapping {
    name: &'static str,
    pattern: String,
    replacement: &'static str,
}

const TUMOR_WHOLE_WORDS: &[&str] = &[
    "tumor",
    "tumour",
    "hepatoma",
    "melanoma",
    "teratoma",
    "thymoma",
    "neoplasia",
    "neoplasm",
];

const TUMOR_ENDINGS: &[&str] = &[
    "[a-z]+inoma",
    "[a-z]+gioma",
    "[a-z]+ocytoma",
    "[a-z]+thelioma",
];

const TUMOR_WORDS_OR_ENDINGS: &[&str] = &[
    "[a-z]*adenoma",
    "[a-z]*sarcoma",
    "[a-z]*lymphoma",
    "[a-z]*papilloma",
    "[a-z]*leukemia",
    "[a-z]*leukaemia",
    "[a-z]*blastoma",
    "[a-z]*lipoma",
    "[a-z]*myoma",
    "[a-z]*acanthoma",
    "[a-z]*fibroma",
    "[a-z]*glioma",
];

// Regex fragments; anything may follow the prefix. F9 is left out because it
// collides with figure panel references.
const CELL_LINE_PREFIXES: &[&str] = &[
    "B-?16", "DA", "Hepa1", "K-?1735", "L5178Y", "MCA", "MCF-7", "MDA-MB", "NFS", "NIH-3T3",
    "P1798", "P19", "P388", "PC4", "RAW117", "RIF", "RMA", "SP2/0", "WEHI",
];

// Literal names, escaped when the pattern is built.
const CELL_LINE_NAMES: &[&str] = &[
    "1246", "14-122", "14-166", "14-259", "15-299", "1C11", "203 cells", "2C3", "320DM", "32D",
    "38C13", "3LL", "3SB", "4T1", "7-M12", "7OZ/3", "82-132", "A20", "A431", "A549", "AB1",
    "AC29", "ADJ-PC-5", "AKR1", "BAL17.7.1", "BCL1", "Bac-1.2F5", "C10", "C1300", "C1300-NB",
    "C1498", "C26", "C4", "C6", "CB101", "COLO", "CT-2A", "CT26", "CT51", "Caco-2", "Comma D",
    "D1-DMBA-3", "D5", "E3", "E6496", "EL-4", "EL4", "ELM-D", "EMT6", "EPEN", "ESb", "F3II",
    "FSA", "FSa-II", "GL26", "GL261", "Gc-4", "H1299", "HCT-116", "HCT-8", "HL-60", "HM7",
    "HT-29", "HT29", "HTH-K", "HeLa", "HepG2", "J558", "J558L", "JBS", "Jurkat", "K36", "K562",
    "L1", "L1210", "L929", "LA-N-2", "LK35.2", "LLC", "LM2", "LM3", "LMM3", "LS 174T", "LSA",
    "LSTRA", "Lewis lung", "M1", "MA13/C", "MA16/C", "MA44", "MAC13", "MAC16", "MAC26", "MC-38",
    "MC12", "MCa-29", "MCa-4", "MDA231", "MEL cells", "MH134", "MIN6", "MLE", "MM3", "MO5", "MOD",
    "MOPC315", "N18", "N18TG2", "N1E-115", "N2A", "NBFL", "NL17", "NL22", "NL4", "NR-S1", "Nb2",
    "Neuro-2A", "OTT6050", "P02", "P03", "P511", "P815", "PC-3", "PC12", "PCC4", "R1.1", "RB13",
    "RENCA", "RI-4-11", "RL-12", "RM-1", "RVC", "RcsX", "S49", "SC-115", "SC115", "SCCVII",
    "SK-CO-1", "SL12", "SMA-560", "SW403", "SW480", "SW620", "Saos-2", "T-47D", "T241", "TA3/St",
    "TBJ-NB", "TEPC-2027", "TK-1", "TSA", "UV2237M", "WiDr", "X63-Ag8.653", "Y1", "YAC-1",
    "sarcoma 180",
];

static MAPPINGS: Lazy<Vec<Mapping>> = Lazy::new(|| {
    let tumor = TUMOR_WHOLE_WORDS
        .iter()
        .chain(TUMOR_ENDINGS)
        .chain(TUMOR_WORDS_OR_ENDINGS)
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    let cell_line_prefixes = CELL_LINE_PREFIXES
        .iter()
        .map(|prefix| format!(r"{prefix}\S*"))
        .collect::<Vec<_>>()
        .join("|");
    let cell_line_names = CELL_LINE_NAMES
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    let rule = |name, pattern: String, replacement| Mapping {
        name,
        pattern,
        replacement,
    };
    vec![
        rule("tt", format!("(?:{tumor})s?"), "tumor_type"),
        rule("cl", cell_line_prefixes, "cell_line"),
        rule("cn", cell_line_names, "cell_line"),
        rule("mice", "mouse|mous|murine".into(), "mice"),
        rule("ko", r"ko|knock(?:ed|s)?(?:\s|-)?outs?".into(), "knock_out"),
        rule("ki", r"knock(?:ed)?(?:\s|-)?ins?".into(), "knock_in"),
        rule("gt", r"gene(?:\s|-)?trap(?:ped|s)?".into(), "gene_trap"),
        rule("wt", r"wt|wild(?:\s|-)?types?".into(), "wild_type"),
        rule("mut", r"\W*-/-\W*".into(), " mut_mut "),
        rule(
            "eday",
            r"e[ ]?\d\d?|e(?:mbryonic)? day[ ]\d\d?".into(),
            "embryonic_day",
        ),
        rule(
            "ee",
            r"(?:(?:[1248]|one)(?:\s|-)cell)|blastocysts?".into(),
            "early_embryo",
        ),
        rule("fig", "fig".into(), "figure"),
        // figure panel references such as a1, b2
        rule("letdig", r"[abcdfghs]\d".into(), ""),
    ]
});

static COMBINED: Lazy<Regex> = Lazy::new(|| {
    let pattern = MAPPINGS
        .iter()
        .map(|m| format!(r"\b(?P<{}>{})\b", m.name, m.pattern))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(64 * (1 << 20))
        .build()
        .expect("valid token normalisation regex")
});

/// Rewrite `text`, replacing every rule match with its canonical token.
///
/// Deterministic but not idempotent in general.
pub fn normalize(text: &str) -> String {
    COMBINED
        .replace_all(text, |caps: &Captures<'_>| replacement_for(caps))
        .into_owned()
}

fn replacement_for(caps: &Captures<'_>) -> &'static str {
    MAPPINGS
        .iter()
        .find(|m| caps.name(m.name).is_some())
        .map(|m| m.replacement)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knock_out_mouse() {
        assert_eq!(normalize("this is a knock out mouse"), "this is a knock_out mice");
    }

    #[test]
    fn knock_out_and_knock_in_variants() {
        assert_eq!(
            normalize("knockout knocksouts knocked out Ko knock-outs"),
            "knock_out knock_out knock_out knock_out knock_out"
        );
        assert_eq!(
            normalize("knockin knocked-in knock ins"),
            "knock_in knock_in knock_in"
        );
    }

    #[test]
    fn wild_type_and_gene_trap() {
        assert_eq!(
            normalize("wildtypes wild type WT wild-types"),
            "wild_type wild_type wild_type wild_type"
        );
        assert_eq!(
            normalize("genetrap gene-trapped gene traps"),
            "gene_trap gene_trap gene_trap"
        );
    }

    #[test]
    fn embryonic_day_notations() {
        assert_eq!(normalize("before e12 after"), "before embryonic_day after");
        assert_eq!(normalize("before E 1 after"), "before embryonic_day after");
        assert_eq!(normalize("before E day 7 after"), "before embryonic_day after");
        assert_eq!(
            normalize("before embryonic day 7 after"),
            "before embryonic_day after"
        );
    }

    #[test]
    fn genotype_notation_collapses_surrounding_punctuation() {
        assert_eq!(
            normalize("before -/- e12. after"),
            "before mut_mut embryonic_day. after"
        );
        // no word boundary after a trailing genotype
        assert_eq!(normalize("text and -/-"), "text and -/-");
    }

    #[test]
    fn tumor_types() {
        assert_eq!(
            normalize("tumours and tumor adenocarcinoma neoplasias"),
            "tumor_type and tumor_type tumor_type tumor_type"
        );
    }

    #[test]
    fn cell_lines() {
        assert_eq!(normalize("B16F10 cells"), "cell_line cells");
        assert_eq!(normalize("B-16, HeLa"), "cell_line, cell_line");
        assert_eq!(normalize("SP2/0 Lewis lung"), "cell_line cell_line");
    }

    #[test]
    fn early_embryo_and_figures() {
        assert_eq!(
            normalize("2-cell one cell blastocysts"),
            "early_embryo early_embryo early_embryo"
        );
        assert_eq!(normalize("see fig 2"), "see figure 2");
        assert_eq!(normalize("panels a1 and b2"), "panels  and ");
    }

    #[test]
    fn unmatched_text_passes_through() {
        let text = "Nothing here needs rewriting, just plain words.";
        assert_eq!(normalize(text), text);
        assert_eq!(normalize(""), "");
    }
}
