//! Construction of samples from curation database rows.
//!
//! Rows arrive as column-name keyed maps, either from a CSV export or from
//! any other row source. Text columns are made safe for the sample file
//! format before they are stored.

use std::{collections::HashMap, io::Read};

use tracing::{debug, info};

use crate::{
    config::RecordFormat,
    data::{
        sample::{Field, Sample, SampleType},
        sample_set::SampleSet,
    },
    error::{Result, SampleError},
};

/// One row keyed by column name.
pub type Row = HashMap<String, String>;

/// Row columns and the sample fields they populate.
const COLUMN_FIELDS: &[(&str, Field)] = &[
    ("pubmed", Field::Id),
    ("creation_date", Field::CreationDate),
    ("year", Field::Year),
    ("isreviewarticle", Field::IsReview),
    ("ref_type", Field::RefType),
    ("supp_status", Field::SuppStatus),
    ("ap_status", Field::ApStatus),
    ("gxd_status", Field::GxdStatus),
    ("go_status", Field::GoStatus),
    ("tumor_status", Field::TumorStatus),
    ("qtl_status", Field::QtlStatus),
];

const TEXT_COLUMNS: &[(&str, Field)] = &[
    ("title", Field::Title),
    ("abstract", Field::Abstract),
    ("ext_text", Field::ExtractedText),
];

const DISCARD_COLUMN: &str = "isdiscard";
const JOURNAL_COLUMN: &str = "journal";

/// Text cleanup applied to free text columns.
#[derive(Debug, Clone, Default)]
pub struct RowCleaning {
    pub format: RecordFormat,
    /// Truncate text columns to this many characters, flattening newlines.
    pub max_text_length: Option<usize>,
}

impl RowCleaning {
    /// Make free text safe to store: optional truncation, delimiters and
    /// non-ASCII characters replaced by spaces.
    pub fn clean_text(&self, text: &str) -> String {
        let text = match self.max_text_length {
            Some(max) => text
                .chars()
                .take(max)
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect(),
            None => text.to_string(),
        };
        self.format
            .clean_delimiters(&text)
            .chars()
            .map(|c| if c.is_ascii() { c } else { ' ' })
            .collect()
    }
}

/// Build a sample of `sample_type` from one row.
///
/// `isdiscard == 1` maps to the negative class, anything else to the
/// positive class. Columns the sample type has no field for are ignored.
pub fn sample_from_row(sample_type: SampleType, row: &Row, cleaning: &RowCleaning) -> Result<Sample> {
    let mut sample = Sample::new(sample_type);
    let column = |name: &str| row.get(name).map(String::as_str).unwrap_or_default();

    if sample_type.is_classified() {
        let class = if column(DISCARD_COLUMN).trim() == "1" {
            sample_type.y_negative()
        } else {
            sample_type.y_positive()
        };
        sample.set_field(Field::KnownClassName, sample_type.class_names()[class])?;
    }

    for (name, field) in COLUMN_FIELDS {
        if sample_type.has_field(*field) {
            sample.set_field(*field, column(*name))?;
        }
    }
    if sample_type.has_field(Field::Journal) {
        let journal = cleaning.clean_text(column(JOURNAL_COLUMN)).replace(' ', "_");
        sample.set_field(Field::Journal, &journal)?;
    }
    for (name, field) in TEXT_COLUMNS {
        sample.set_field(*field, &cleaning.clean_text(column(*name)))?;
    }
    debug!(id = sample.id(), "built sample from row");
    Ok(sample)
}

/// Read a CSV export with a header row into a sample set.
pub fn read_csv_rows<R: Read>(
    reader: R,
    sample_type: SampleType,
    cleaning: &RowCleaning,
) -> Result<SampleSet> {
    let mut set = SampleSet::with_format(Some(sample_type), cleaning.format.clone());
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    for (index, row) in csv.deserialize::<Row>().enumerate() {
        let row = row.map_err(|err| SampleError::Record {
            index,
            snippet: String::new(),
            source: Box::new(err.into()),
        })?;
        let sample = sample_from_row(sample_type, &row, cleaning).map_err(|source| {
            SampleError::Record {
                index,
                snippet: row.get("pubmed").cloned().unwrap_or_default(),
                source: Box::new(source),
            }
        })?;
        set.add_sample(sample)?;
    }
    info!(
        samples = set.len(),
        positives = set.num_positives(),
        negatives = set.num_negatives(),
        "converted rows to samples"
    );
    Ok(set)
}
