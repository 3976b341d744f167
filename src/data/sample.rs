//! Sample record model: one article with its reference metadata, optional
//! known classification and the in-place preprocessing transformations.
//!
//! Every concrete record layout is a [`SampleType`]. The type fixes the field
//! order used on disk, the two class names and which of them is positive.
//! String coercion of typed fields (`year`, `isReview`) happens only in
//! [`Sample::set_field`] and [`Sample::field_text`].

use std::{borrow::Cow, fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::RecordFormat,
    error::{Result, SampleError},
    nlp::{
        clean::{self, Stem},
        figure_text::{FigureTextConverter, PARAGRAPH_BOUNDARY},
        normalize::normalize,
    },
};

static CLASS_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid class regex"));

static MICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:mice|mouse|murine)\b").expect("valid mice regex"));

/// Synthetic extra info column: abstract length in characters.
pub const ABSTRACT_LEN: &str = "abstractLen";
/// Synthetic extra info column: extracted text length in characters.
pub const TEXT_LEN: &str = "textLen";

/// Named sample field. The name is the column header used on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    KnownClassName,
    Id,
    CreationDate,
    Year,
    IsReview,
    RefType,
    SuppStatus,
    ApStatus,
    GxdStatus,
    GoStatus,
    TumorStatus,
    QtlStatus,
    Journal,
    Title,
    Abstract,
    ExtractedText,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::KnownClassName,
        Field::Id,
        Field::CreationDate,
        Field::Year,
        Field::IsReview,
        Field::RefType,
        Field::SuppStatus,
        Field::ApStatus,
        Field::GxdStatus,
        Field::GoStatus,
        Field::TumorStatus,
        Field::QtlStatus,
        Field::Journal,
        Field::Title,
        Field::Abstract,
        Field::ExtractedText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::KnownClassName => "knownClassName",
            Field::Id => "ID",
            Field::CreationDate => "creationDate",
            Field::Year => "year",
            Field::IsReview => "isReview",
            Field::RefType => "refType",
            Field::SuppStatus => "suppStatus",
            Field::ApStatus => "apStatus",
            Field::GxdStatus => "gxdStatus",
            Field::GoStatus => "goStatus",
            Field::TumorStatus => "tumorStatus",
            Field::QtlStatus => "qtlStatus",
            Field::Journal => "journal",
            Field::Title => "title",
            Field::Abstract => "abstract",
            Field::ExtractedText => "extractedText",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRIM_TRIAGE_CLASSIFIED_FIELDS: &[Field] = &[
    Field::KnownClassName,
    Field::Id,
    Field::CreationDate,
    Field::Year,
    Field::IsReview,
    Field::RefType,
    Field::SuppStatus,
    Field::ApStatus,
    Field::GxdStatus,
    Field::GoStatus,
    Field::TumorStatus,
    Field::QtlStatus,
    Field::Journal,
    Field::Title,
    Field::Abstract,
    Field::ExtractedText,
];

const PRIM_TRIAGE_UNCLASSIFIED_FIELDS: &[Field] =
    &[Field::Id, Field::Title, Field::Abstract, Field::ExtractedText];

const CUR_GROUP_CLASSIFIED_FIELDS: &[Field] = &[
    Field::KnownClassName,
    Field::Id,
    Field::CreationDate,
    Field::Year,
    Field::Journal,
    Field::Title,
    Field::Abstract,
    Field::ExtractedText,
];

/// Concrete sample record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SampleType {
    /// Primary triage training sample: keep or discard a reference.
    #[serde(rename = "PrimTriageClassifiedSample")]
    PrimTriageClassified,
    /// Primary triage sample awaiting prediction.
    #[serde(rename = "PrimTriageUnClassifiedSample")]
    PrimTriageUnClassified,
    /// Curation group training sample: selected for the group or not.
    #[serde(rename = "CurGroupClassifiedSample")]
    CurGroupClassified,
}

impl SampleType {
    pub const ALL: [SampleType; 3] = [
        SampleType::PrimTriageClassified,
        SampleType::PrimTriageUnClassified,
        SampleType::CurGroupClassified,
    ];

    /// Name recorded in sample file metadata.
    pub fn name(self) -> &'static str {
        match self {
            Self::PrimTriageClassified => "PrimTriageClassifiedSample",
            Self::PrimTriageUnClassified => "PrimTriageUnClassifiedSample",
            Self::CurGroupClassified => "CurGroupClassifiedSample",
        }
    }

    /// Fields in file order.
    pub fn field_names(self) -> &'static [Field] {
        match self {
            Self::PrimTriageClassified => PRIM_TRIAGE_CLASSIFIED_FIELDS,
            Self::PrimTriageUnClassified => PRIM_TRIAGE_UNCLASSIFIED_FIELDS,
            Self::CurGroupClassified => CUR_GROUP_CLASSIFIED_FIELDS,
        }
    }

    pub fn has_field(self, field: Field) -> bool {
        self.field_names().contains(&field)
    }

    /// True when records carry a known class name.
    pub fn is_classified(self) -> bool {
        self.has_field(Field::KnownClassName)
    }

    /// The two class names; a known class is stored as an index into these.
    pub fn class_names(self) -> [&'static str; 2] {
        match self {
            Self::PrimTriageClassified | Self::PrimTriageUnClassified => ["discard", "keep"],
            Self::CurGroupClassified => ["selected", "unselected"],
        }
    }

    /// Index of the positive class. Curation group samples count
    /// "selected" (index 0) as positive.
    pub fn y_positive(self) -> usize {
        match self {
            Self::PrimTriageClassified | Self::PrimTriageUnClassified => 1,
            Self::CurGroupClassified => 0,
        }
    }

    pub fn y_negative(self) -> usize {
        1 - self.y_positive()
    }

    /// Column header: field names joined by the field separator.
    pub fn header_line(self, field_sep: char) -> String {
        let names: Vec<&str> = self.field_names().iter().map(|f| f.as_str()).collect();
        names.join(&field_sep.to_string())
    }

    /// Fields reported alongside predictions for classified reference samples.
    fn extra_info_fields(self) -> &'static [Field] {
        match self {
            Self::PrimTriageClassified => &PRIM_TRIAGE_CLASSIFIED_FIELDS[2..13],
            Self::CurGroupClassified => &CUR_GROUP_CLASSIFIED_FIELDS[2..5],
            Self::PrimTriageUnClassified => &[],
        }
    }

    /// Names of the [`Sample::extra_info`] values, in order.
    pub fn extra_info_field_names(self) -> Vec<&'static str> {
        if !self.is_classified() {
            return Vec::new();
        }
        self.extra_info_fields()
            .iter()
            .map(|f| f.as_str())
            .chain([ABSTRACT_LEN, TEXT_LEN])
            .collect()
    }

    /// Canonical index of a class name. Only the first word token of `name`
    /// is considered, so stray delimiter fragments such as `";;keep"` pass.
    pub fn validate_class_name(self, name: &str) -> Result<usize> {
        let token = CLASS_TOKEN
            .find(name)
            .map(|m| m.as_str())
            .ok_or_else(|| SampleError::InvalidClassName(name.to_string()))?;
        self.class_names()
            .iter()
            .position(|class| *class == token)
            .ok_or_else(|| SampleError::InvalidClassName(name.to_string()))
    }
}

impl FromStr for SampleType {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SampleError::UnknownSampleType(s.to_string()))
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One article record.
///
/// Fields absent from the record's [`SampleType`] keep their defaults and are
/// never read or written.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    sample_type: SampleType,
    known_class: Option<usize>,
    id: String,
    creation_date: String,
    year: Option<i32>,
    is_review: bool,
    ref_type: String,
    supp_status: String,
    ap_status: String,
    gxd_status: String,
    go_status: String,
    tumor_status: String,
    qtl_status: String,
    journal: String,
    title: String,
    abstract_text: String,
    extracted_text: String,
    rejection: Option<String>,
}

impl Sample {
    /// Empty record of the given type.
    pub fn new(sample_type: SampleType) -> Self {
        Self {
            sample_type,
            known_class: None,
            id: String::new(),
            creation_date: String::new(),
            year: None,
            is_review: false,
            ref_type: String::new(),
            supp_status: String::new(),
            ap_status: String::new(),
            gxd_status: String::new(),
            go_status: String::new(),
            tumor_status: String::new(),
            qtl_status: String::new(),
            journal: String::new(),
            title: String::new(),
            abstract_text: String::new(),
            extracted_text: String::new(),
            rejection: None,
        }
    }

    /// Parse one delimited record. The text is split into exactly as many
    /// parts as the type has fields; separators past the last split stay in
    /// the final field.
    pub fn parse_record(sample_type: SampleType, text: &str, field_sep: char) -> Result<Self> {
        let fields = sample_type.field_names();
        let values: Vec<&str> = text.splitn(fields.len(), field_sep).collect();
        if values.len() != fields.len() {
            return Err(SampleError::FieldCount {
                sample_type: sample_type.name(),
                expected: fields.len(),
                found: values.len(),
            });
        }
        let mut sample = Self::new(sample_type);
        for (field, value) in fields.iter().zip(values) {
            sample.set_field(*field, value)?;
        }
        Ok(sample)
    }

    /// Inverse of [`Sample::parse_record`].
    ///
    /// Fails instead of writing a record that would read back differently: a
    /// classified sample needs a known class, and no value may contain a
    /// delimiter that changes how the record splits.
    pub fn to_record_text(&self, format: &RecordFormat) -> Result<String> {
        if self.sample_type.is_classified() && self.known_class.is_none() {
            return Err(SampleError::MissingKnownClass {
                id: self.id.clone(),
            });
        }
        let fields = self.sample_type.field_names();
        let mut text = String::new();
        for (i, field) in fields.iter().enumerate() {
            let value = self.text_of(*field);
            if !format.can_hold(&value, i + 1 == fields.len()) {
                return Err(SampleError::DelimiterInField {
                    id: self.id.clone(),
                    field: field.as_str(),
                    value: value.into_owned(),
                });
            }
            if i > 0 {
                text.push(format.field_sep);
            }
            text.push_str(&value);
        }
        Ok(text)
    }

    /// Assign fields by name. Names not in this record's schema are ignored;
    /// fields not given keep their current values.
    pub fn set_fields<I, K, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in values {
            let name = name.as_ref();
            match Field::from_name(name) {
                Some(field) if self.sample_type.has_field(field) => {
                    self.set_field(field, value.as_ref())?;
                }
                _ => debug!(field = name, sample_type = %self.sample_type, "ignoring field"),
            }
        }
        Ok(self)
    }

    /// Assign one field from its serialized text form.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<&mut Self> {
        self.require(field)?;
        match field {
            Field::KnownClassName => {
                self.known_class = Some(self.sample_type.validate_class_name(value)?);
            }
            Field::Id => self.id = value.trim().to_string(),
            Field::CreationDate => self.creation_date = value.to_string(),
            Field::Year => self.year = parse_year(value)?,
            Field::IsReview => self.is_review = parse_flag(field, value)?,
            Field::RefType => self.ref_type = value.to_string(),
            Field::SuppStatus => self.supp_status = value.to_string(),
            Field::ApStatus => self.ap_status = value.to_string(),
            Field::GxdStatus => self.gxd_status = value.to_string(),
            Field::GoStatus => self.go_status = value.to_string(),
            Field::TumorStatus => self.tumor_status = value.to_string(),
            Field::QtlStatus => self.qtl_status = value.to_string(),
            Field::Journal => self.journal = value.to_string(),
            Field::Title => self.title = value.to_string(),
            Field::Abstract => self.abstract_text = value.to_string(),
            Field::ExtractedText => self.extracted_text = value.to_string(),
        }
        Ok(self)
    }

    /// Serialized value of a field by name.
    pub fn field(&self, name: &str) -> Result<String> {
        let field = Field::from_name(name).ok_or_else(|| SampleError::UnknownField {
            sample_type: self.sample_type.name(),
            field: name.to_string(),
        })?;
        self.field_text(field)
    }

    /// Serialized value of a field.
    pub fn field_text(&self, field: Field) -> Result<String> {
        self.require(field)?;
        Ok(self.text_of(field).into_owned())
    }

    fn require(&self, field: Field) -> Result<()> {
        if self.sample_type.has_field(field) {
            Ok(())
        } else {
            Err(SampleError::UnknownField {
                sample_type: self.sample_type.name(),
                field: field.as_str().to_string(),
            })
        }
    }

    fn text_of(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::KnownClassName => Cow::Borrowed(self.known_class_name().unwrap_or_default()),
            Field::Id => Cow::Borrowed(&self.id),
            Field::CreationDate => Cow::Borrowed(&self.creation_date),
            Field::Year => Cow::Owned(self.year.map(|y| y.to_string()).unwrap_or_default()),
            Field::IsReview => Cow::Borrowed(if self.is_review { "1" } else { "0" }),
            Field::RefType => Cow::Borrowed(&self.ref_type),
            Field::SuppStatus => Cow::Borrowed(&self.supp_status),
            Field::ApStatus => Cow::Borrowed(&self.ap_status),
            Field::GxdStatus => Cow::Borrowed(&self.gxd_status),
            Field::GoStatus => Cow::Borrowed(&self.go_status),
            Field::TumorStatus => Cow::Borrowed(&self.tumor_status),
            Field::QtlStatus => Cow::Borrowed(&self.qtl_status),
            Field::Journal => Cow::Borrowed(&self.journal),
            Field::Title => Cow::Borrowed(&self.title),
            Field::Abstract => Cow::Borrowed(&self.abstract_text),
            Field::ExtractedText => Cow::Borrowed(&self.extracted_text),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn field_names(&self) -> &'static [Field] {
        self.sample_type.field_names()
    }

    pub fn header_line(&self, field_sep: char) -> String {
        self.sample_type.header_line(field_sep)
    }

    pub fn class_names(&self) -> [&'static str; 2] {
        self.sample_type.class_names()
    }

    pub fn y_positive(&self) -> usize {
        self.sample_type.y_positive()
    }

    pub fn y_negative(&self) -> usize {
        self.sample_type.y_negative()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Surrounding whitespace is dropped, as when parsing.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into().trim().to_string();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    pub fn set_abstract(&mut self, text: impl Into<String>) -> &mut Self {
        self.abstract_text = text.into();
        self
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn set_extracted_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.extracted_text = text.into();
        self
    }

    /// Journal name, for types with a journal field.
    pub fn journal(&self) -> Option<&str> {
        self.sample_type
            .has_field(Field::Journal)
            .then_some(self.journal.as_str())
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn is_review(&self) -> bool {
        self.is_review
    }

    /// Title, abstract and extracted text joined by newlines.
    pub fn document(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.title, self.abstract_text, self.extracted_text
        )
    }

    pub fn known_class_name(&self) -> Option<&'static str> {
        self.known_class
            .map(|index| self.sample_type.class_names()[index])
    }

    pub fn set_known_class_name(&mut self, name: &str) -> Result<&mut Self> {
        self.set_field(Field::KnownClassName, name)
    }

    /// Index of the known class within [`SampleType::class_names`].
    pub fn known_y_value(&self) -> Option<usize> {
        self.known_class
    }

    pub fn is_positive(&self) -> bool {
        self.known_class == Some(self.sample_type.y_positive())
    }

    pub fn is_negative(&self) -> bool {
        self.known_class == Some(self.sample_type.y_negative())
    }

    /// Values for [`SampleType::extra_info_field_names`].
    pub fn extra_info(&self) -> Vec<String> {
        if !self.sample_type.is_classified() {
            return Vec::new();
        }
        self.sample_type
            .extra_info_fields()
            .iter()
            .map(|field| self.text_of(*field).into_owned())
            .chain([
                self.abstract_text.chars().count().to_string(),
                self.extracted_text.chars().count().to_string(),
            ])
            .collect()
    }

    /// Flag the record for optional omission downstream.
    pub fn reject(&mut self, reason: impl Into<String>) -> &mut Self {
        self.rejection = Some(reason.into());
        self
    }

    pub fn clear_reject(&mut self) -> &mut Self {
        self.rejection = None;
        self
    }

    pub fn is_reject(&self) -> bool {
        self.rejection.is_some()
    }

    pub fn reject_reason(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    fn map_text_fields(&mut self, f: impl Fn(&str) -> String) -> &mut Self {
        self.title = f(&self.title);
        self.abstract_text = f(&self.abstract_text);
        self.extracted_text = f(&self.extracted_text);
        self
    }

    /// Replace the extracted text with its figure/table blurbs.
    pub fn figure_text(&mut self, converter: &FigureTextConverter) -> &mut Self {
        let blurbs = converter.extract(&self.extracted_text);
        self.extracted_text = blurbs.join(PARAGRAPH_BOUNDARY);
        self
    }

    pub fn feature_transform(&mut self) -> &mut Self {
        self.map_text_fields(normalize)
    }

    pub fn remove_urls(&mut self) -> &mut Self {
        self.map_text_fields(clean::remove_urls)
    }

    pub fn remove_urls_clean_stem(&mut self, stemmer: &dyn Stem) -> &mut Self {
        self.map_text_fields(|text| clean::remove_urls_clean_stem(text, stemmer))
    }

    pub fn token_per_line(&mut self) -> &mut Self {
        self.map_text_fields(clean::token_per_line)
    }

    /// Shorten text fields for eyeballing pipeline output.
    pub fn truncate_text(&mut self) -> &mut Self {
        self.title = clean::truncate_flat(&self.title, 10);
        self.abstract_text = clean::truncate_flat(&self.abstract_text, 20);
        self.extracted_text = clean::truncate_flat(&self.extracted_text, 20) + "\n";
        self
    }

    /// Replace text fields with placeholders for eyeballing pipeline output.
    pub fn remove_text(&mut self) -> &mut Self {
        self.title = self.title.chars().take(10).collect();
        self.abstract_text = "abstract...".to_string();
        self.extracted_text = "extracted text...\n".to_string();
        self
    }

    /// Append a `journal__<name>` token so a classifier can learn per journal bias.
    pub fn add_journal_feature(&mut self) -> Result<&mut Self> {
        let journal = self.journal().ok_or(SampleError::MissingCapability {
            sample_type: self.sample_type.name(),
            capability: "journal",
        })?;
        let token = format!(" journal__{}", journal.replace(' ', "_").to_lowercase());
        self.extracted_text.push_str(&token);
        Ok(self)
    }

    pub fn reject_if_no_mice(&mut self) -> &mut Self {
        if !MICE.is_match(&self.document()) {
            self.reject("no mice/mouse/murine in text");
        }
        self
    }

    pub fn reject_reviews(&mut self) -> Result<&mut Self> {
        if !self.sample_type.has_field(Field::IsReview) {
            return Err(SampleError::MissingCapability {
                sample_type: self.sample_type.name(),
                capability: "review flag",
            });
        }
        if self.is_review {
            self.reject("review article");
        }
        Ok(self)
    }
}

fn parse_year(value: &str) -> Result<Option<i32>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SampleError::InvalidFieldValue {
            field: Field::Year.as_str(),
            value: value.to_string(),
        })
}

fn parse_flag(field: Field, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" | "" => Ok(false),
        other => Err(SampleError::InvalidFieldValue {
            field: field.as_str(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{clean::SnowballStemmer, figure_text::FigureTextMode};

    const FIG_RECORD: &str = "keep|pmID2|01/01/1900|1900|0|non-peer reviewed|supp status2|\
apstat2|gxdstat2|goStat2|tumorstat2|qtlStat2|Journal of Insomnia|My Title w/ Fig text|\n\
My Abstract w/ Fig text and -/-|My text: it's a knock out https://foo text www.foo.org word word  -/-.\n\
\n\
This could be a table reference paragraph.\n\
\n\
Figure. 1: this is a figure legend\n\
\n\
the final words";

    fn fig_sample() -> Sample {
        Sample::parse_record(SampleType::PrimTriageClassified, FIG_RECORD, '|').unwrap()
    }

    #[test]
    fn parse_assigns_fields_in_schema_order() {
        let sample = fig_sample();
        assert_eq!(sample.id(), "pmID2");
        assert_eq!(sample.known_class_name(), Some("keep"));
        assert_eq!(sample.year(), Some(1900));
        assert!(!sample.is_review());
        assert_eq!(sample.journal(), Some("Journal of Insomnia"));
        assert_eq!(sample.field("qtlStatus").unwrap(), "qtlStat2");
        assert!(sample.is_positive());
        assert!(!sample.is_negative());
    }

    #[test]
    fn parse_rejects_short_records() {
        let err = Sample::parse_record(SampleType::PrimTriageUnClassified, "id|title", '|')
            .unwrap_err();
        assert!(matches!(
            err,
            SampleError::FieldCount {
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn last_field_keeps_extra_separators() {
        let sample =
            Sample::parse_record(SampleType::PrimTriageUnClassified, "1|t|a|x|y|z", '|').unwrap();
        assert_eq!(sample.extracted_text(), "x|y|z");
    }

    #[test]
    fn record_text_refuses_values_that_would_split() {
        let format = RecordFormat::default();
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample.set_id("1").set_title("A|B").set_abstract("abs");
        let err = sample.to_record_text(&format).unwrap_err();
        assert!(matches!(
            err,
            SampleError::DelimiterInField { field: "title", .. }
        ));

        sample.set_title("A B").set_abstract("ends with;;\nmore");
        assert!(sample.to_record_text(&format).is_err());

        // separators in the final field survive splitn
        sample.set_abstract("abs").set_extracted_text("see Table 1|2;");
        let text = sample.to_record_text(&format).unwrap();
        assert_eq!(text, "1|A B|abs|see Table 1|2;");
        let parsed = Sample::parse_record(SampleType::PrimTriageUnClassified, &text, '|').unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn classified_record_text_needs_known_class() {
        let mut sample = Sample::new(SampleType::PrimTriageClassified);
        sample.set_id("9");
        assert!(matches!(
            sample.to_record_text(&RecordFormat::default()),
            Err(SampleError::MissingKnownClass { ref id }) if id == "9"
        ));
        sample.set_known_class_name("discard").unwrap();
        assert!(sample.to_record_text(&RecordFormat::default()).is_ok());
    }

    #[test]
    fn set_id_trims_like_parse() {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample.set_id("  pmid7 \n");
        assert_eq!(sample.id(), "pmid7");
        let text = sample.to_record_text(&RecordFormat::default()).unwrap();
        let parsed = Sample::parse_record(SampleType::PrimTriageUnClassified, &text, '|').unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn invalid_class_name_fails_parse() {
        let err = Sample::parse_record(SampleType::CurGroupClassified, "keep|1|d|2000|j|t|a|x", '|')
            .unwrap_err();
        assert!(matches!(err, SampleError::InvalidClassName(ref n) if n == "keep"));
    }

    #[test]
    fn class_name_validation_strips_fragments() {
        let t = SampleType::PrimTriageClassified;
        assert_eq!(t.validate_class_name(";discard").unwrap(), 0);
        assert_eq!(t.validate_class_name("\nkeep ").unwrap(), 1);
        assert!(t.validate_class_name("bad").is_err());
        assert!(t.validate_class_name(";;").is_err());
    }

    #[test]
    fn polarity_differs_between_types() {
        let mut cur = Sample::new(SampleType::CurGroupClassified);
        cur.set_known_class_name("selected").unwrap();
        assert_eq!(cur.known_y_value(), Some(0));
        assert!(cur.is_positive());

        let mut prim = Sample::new(SampleType::PrimTriageClassified);
        prim.set_known_class_name("discard").unwrap();
        assert_eq!(prim.known_y_value(), Some(0));
        assert!(prim.is_negative());
    }

    #[test]
    fn typed_fields_coerce_at_the_boundary() {
        let mut sample = Sample::new(SampleType::PrimTriageClassified);
        sample
            .set_field(Field::Year, " ")
            .unwrap()
            .set_field(Field::IsReview, "true")
            .unwrap();
        assert_eq!(sample.year(), None);
        assert_eq!(sample.field("isReview").unwrap(), "1");
        assert_eq!(sample.field("year").unwrap(), "");
        assert!(matches!(
            sample.set_field(Field::Year, "19x0"),
            Err(SampleError::InvalidFieldValue { field: "year", .. })
        ));
        assert!(sample.set_field(Field::IsReview, "maybe").is_err());
    }

    #[test]
    fn fields_outside_schema_are_unknown() {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        assert!(matches!(
            sample.set_field(Field::Journal, "J"),
            Err(SampleError::UnknownField { .. })
        ));
        assert!(sample.field("journal").is_err());
        assert!(sample.field("noSuchField").is_err());
        assert_eq!(sample.journal(), None);
    }

    #[test]
    fn set_fields_ignores_unknown_names() {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample
            .set_fields([("ID", "99"), ("title", "T"), ("bogus", "x")])
            .unwrap();
        assert_eq!(sample.id(), "99");
        assert_eq!(sample.title(), "T");
        assert_eq!(sample.field("abstract").unwrap(), "");
    }

    #[test]
    fn figure_text_then_document() {
        let mut sample = fig_sample();
        sample.figure_text(&FigureTextConverter::new(FigureTextMode::LegCloseWords, 50));
        assert_eq!(
            sample.document().trim(),
            "My Title w/ Fig text\n\nMy Abstract w/ Fig text and -/-\n\
             This could be a table reference paragraph.\n\nFigure. 1: this is a figure legend"
        );
    }

    #[test]
    fn clean_stem_document() {
        let mut sample = fig_sample();
        sample.remove_urls_clean_stem(&SnowballStemmer::english());
        assert_eq!(
            sample.document().trim(),
            "my titl figur text\n my abstract figur text and\n my text it knock_out text \
             word word mut_mut this could be tabl refer paragraph figur this is figur legend \
             the final word"
        );
    }

    #[test]
    fn debug_aids() {
        let mut sample = fig_sample();
        sample.truncate_text();
        assert_eq!(sample.title(), "My Title w");
        assert_eq!(sample.abstract_text(), " My Abstract w/ Fig ");
        assert_eq!(sample.extracted_text(), "My text: it's a knoc\n");

        let mut sample = fig_sample();
        sample.remove_text();
        assert_eq!(sample.title(), "My Title w");
        assert_eq!(sample.abstract_text(), "abstract...");
        assert_eq!(sample.extracted_text(), "extracted text...\n");
    }

    #[test]
    fn journal_feature_and_rejections() {
        let mut sample = fig_sample();
        sample.add_journal_feature().unwrap();
        assert!(sample.extracted_text().ends_with(" journal__journal_of_insomnia"));

        sample.reject_if_no_mice();
        assert_eq!(sample.reject_reason(), Some("no mice/mouse/murine in text"));
        sample.clear_reject();
        sample.set_field(Field::IsReview, "1").unwrap();
        sample.reject_reviews().unwrap();
        assert_eq!(sample.reject_reason(), Some("review article"));

        let mut unclassified = Sample::new(SampleType::PrimTriageUnClassified);
        assert!(unclassified.add_journal_feature().is_err());
        assert!(unclassified.reject_reviews().is_err());
        unclassified.set_abstract("Murine models");
        unclassified.reject_if_no_mice();
        assert!(!unclassified.is_reject());
    }

    #[test]
    fn extra_info_lines_up_with_names() {
        let sample = fig_sample();
        let names = sample.sample_type().extra_info_field_names();
        let values = sample.extra_info();
        assert_eq!(names.len(), values.len());
        assert_eq!(names.first(), Some(&"creationDate"));
        assert_eq!(names.last(), Some(&TEXT_LEN));
        let journal = names.iter().position(|n| *n == "journal").unwrap();
        assert_eq!(values[journal], "Journal of Insomnia");
        let abstract_len = names.iter().position(|n| *n == ABSTRACT_LEN).unwrap();
        assert_eq!(
            values[abstract_len],
            sample.abstract_text().len().to_string()
        );
        assert!(SampleType::PrimTriageUnClassified
            .extra_info_field_names()
            .is_empty());
    }

    #[test]
    fn header_lines() {
        assert_eq!(
            SampleType::PrimTriageUnClassified.header_line('|'),
            "ID|title|abstract|extractedText"
        );
        assert_eq!(
            SampleType::CurGroupClassified.header_line('|'),
            "knownClassName|ID|creationDate|year|journal|title|abstract|extractedText"
        );
    }

    #[test]
    fn sample_type_names_round_trip() {
        for t in SampleType::ALL {
            assert_eq!(t.name().parse::<SampleType>().unwrap(), t);
        }
        assert!(matches!(
            "NoSuchSample".parse::<SampleType>(),
            Err(SampleError::UnknownSampleType(_))
        ));
    }
}
