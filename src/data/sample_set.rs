//! Ordered collections of samples and the flat sample file format.
//!
//! Layout: `[#meta k=v ... RECORDEND] header RECORDEND (record RECORDEND)*`.
//! The metadata line names the sample type so files describe themselves.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::{
    config::RecordFormat,
    data::{
        preprocess::{parse_steps, PreprocessContext},
        sample::{Field, Sample, SampleType},
    },
    error::{Result, SampleError},
};

/// Tag opening the optional metadata line.
pub const META_TAG: &str = "#meta";
/// Metadata key holding the sample type name.
pub const META_SAMPLE_TYPE: &str = "sampleObjType";

const SNIPPET_CHARS: usize = 60;

/// Free-form key/value pairs stored on the metadata line, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSetMetaData {
    items: IndexMap<String, String>,
}

impl SampleSetMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `text` starts with the metadata tag.
    pub fn is_meta_line(text: &str) -> bool {
        text.trim_start().starts_with(META_TAG)
    }

    /// Parse a metadata line. Tokens without `=` are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim_start().strip_prefix(META_TAG)?;
        let items = body
            .split_whitespace()
            .filter_map(|token| token.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some(Self { items })
    }

    /// Render as one line. Whitespace inside keys and values becomes `_`.
    pub fn to_line(&self) -> String {
        let mut line = META_TAG.to_string();
        for (key, value) in &self.items {
            line.push(' ');
            line.push_str(&no_whitespace(key));
            line.push('=');
            line.push_str(&no_whitespace(value));
        }
        line
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.items.insert(key.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn merge(&mut self, other: SampleSetMetaData) {
        self.items.extend(other.items);
    }
}

fn no_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() || c == '=' { '_' } else { c })
        .collect()
}

/// What [`SampleSet::write`] emits besides the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub write_meta: bool,
    pub write_header: bool,
    pub omit_rejects: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            write_meta: true,
            write_header: true,
            omit_rejects: false,
        }
    }
}

/// Samples of one [`SampleType`] with metadata and running aggregates.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    sample_type: Option<SampleType>,
    format: RecordFormat,
    samples: Vec<Sample>,
    meta: SampleSetMetaData,
    num_positives: usize,
    num_negatives: usize,
    journals: BTreeSet<String>,
}

impl SampleSet {
    /// Empty set, optionally bound to a sample type. An unbound set takes the
    /// type of the first sample added or read.
    pub fn new(sample_type: Option<SampleType>) -> Self {
        Self::with_format(sample_type, RecordFormat::default())
    }

    pub fn with_format(sample_type: Option<SampleType>, format: RecordFormat) -> Self {
        Self {
            sample_type,
            format,
            ..Self::default()
        }
    }

    /// Read a sample file into this set.
    ///
    /// The first chunk after the optional metadata line is always the header
    /// and is discarded unparsed. The sample type comes from the metadata
    /// line, falling back to the type this set is bound to.
    pub fn read<R: Read>(&mut self, mut reader: R) -> Result<&mut Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.read_text(&text)
    }

    pub fn read_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.read(BufReader::new(file))?;
        info!(
            path = %path.display(),
            samples = self.samples.len(),
            sample_type = ?self.sample_type.map(SampleType::name),
            "read sample file"
        );
        Ok(self)
    }

    /// Parse sample file contents into this set.
    pub fn read_text(&mut self, text: &str) -> Result<&mut Self> {
        if text.trim().is_empty() {
            return Err(SampleError::EmptyInput);
        }
        let mut chunks: Vec<&str> = text.split(self.format.record_end.as_str()).collect();
        if chunks.last().is_some_and(|last| last.trim().is_empty()) {
            chunks.pop();
        }
        let mut chunks = chunks.into_iter();

        let mut first = chunks.next();
        let mut meta = SampleSetMetaData::new();
        if let Some(line) = first.filter(|c| SampleSetMetaData::is_meta_line(c)) {
            meta = SampleSetMetaData::parse(line).unwrap_or_default();
            first = chunks.next();
        }
        if first.is_none() {
            return Err(SampleError::EmptyInput);
        }

        let sample_type = match meta.get(META_SAMPLE_TYPE) {
            Some(name) => name.parse::<SampleType>()?,
            None => self.sample_type.ok_or(SampleError::MissingSampleType)?,
        };
        self.bind(sample_type)?;
        self.meta.merge(meta);

        for (index, chunk) in chunks.enumerate() {
            let sample = Sample::parse_record(sample_type, chunk, self.format.field_sep)
                .map_err(|source| SampleError::Record {
                    index,
                    snippet: chunk.trim().chars().take(SNIPPET_CHARS).collect(),
                    source: Box::new(source),
                })?;
            self.add_sample(sample)?;
        }
        Ok(self)
    }

    /// Write this set as a sample file.
    pub fn write<W: Write>(&self, mut writer: W, options: WriteOptions) -> Result<()> {
        let sample_type = self.sample_type.ok_or(SampleError::MissingSampleType)?;
        let record_end = self.format.record_end.as_str();
        // every record is checked before anything is written
        let records = self
            .iter_samples(options.omit_rejects)
            .enumerate()
            .map(|(index, sample)| {
                sample
                    .to_record_text(&self.format)
                    .map_err(|source| SampleError::Record {
                        index,
                        snippet: sample.id().to_string(),
                        source: Box::new(source),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        if options.write_meta {
            let mut meta = self.meta.clone();
            meta.set(META_SAMPLE_TYPE, sample_type.name());
            write!(writer, "{}{record_end}", meta.to_line())?;
        }
        if options.write_header {
            write!(
                writer,
                "{}{record_end}",
                sample_type.header_line(self.format.field_sep)
            )?;
        }
        for record in records {
            write!(writer, "{record}{record_end}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P, options: WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write(BufWriter::new(file), options)?;
        info!(
            path = %path.display(),
            samples = self.num_samples(options.omit_rejects),
            "wrote sample file"
        );
        Ok(())
    }

    fn bind(&mut self, sample_type: SampleType) -> Result<()> {
        match self.sample_type {
            Some(bound) if bound != sample_type => Err(SampleError::TypeMismatch {
                expected: bound.name(),
                found: sample_type.name(),
            }),
            _ => {
                self.sample_type = Some(sample_type);
                Ok(())
            }
        }
    }

    /// Append a sample, updating class counts and the journal set.
    pub fn add_sample(&mut self, sample: Sample) -> Result<&mut Self> {
        self.bind(sample.sample_type())?;
        self.count(&sample);
        self.samples.push(sample);
        Ok(self)
    }

    fn count(&mut self, sample: &Sample) {
        if sample.is_positive() {
            self.num_positives += 1;
        } else if sample.is_negative() {
            self.num_negatives += 1;
        }
        if let Some(journal) = sample.journal() {
            self.journals.insert(journal.to_string());
        }
    }

    fn recount(&mut self) {
        self.num_positives = 0;
        self.num_negatives = 0;
        self.journals.clear();
        let samples = std::mem::take(&mut self.samples);
        for sample in &samples {
            self.count(sample);
        }
        self.samples = samples;
    }

    pub fn add_samples<I: IntoIterator<Item = Sample>>(&mut self, samples: I) -> Result<&mut Self> {
        for sample in samples {
            self.add_sample(sample)?;
        }
        Ok(self)
    }

    /// Apply the named steps, in order, to every sample in order. Step names
    /// are resolved before any sample is touched. Returns the rejected
    /// samples.
    pub fn preprocess<S: AsRef<str>>(
        &mut self,
        step_names: &[S],
        ctx: &PreprocessContext<'_>,
    ) -> Result<Vec<&Sample>> {
        let steps = parse_steps(step_names)?;
        debug!(?steps, samples = self.samples.len(), "preprocessing");

        for index in 0..self.samples.len() {
            for step in &steps {
                let applied = step.apply(&mut self.samples[index], ctx).map(|_| ());
                if let Err(source) = applied {
                    let last_ok = index
                        .checked_sub(1)
                        .map(|prev| self.samples[prev].id().to_string())
                        .unwrap_or_else(|| "none".to_string());
                    return Err(SampleError::Preprocess {
                        step: step.to_string(),
                        index,
                        last_ok,
                        source: Box::new(source),
                    });
                }
            }
        }

        let rejects = self.rejects();
        for sample in &rejects {
            warn!(
                id = sample.id(),
                reason = sample.reject_reason().unwrap_or_default(),
                "sample rejected"
            );
        }
        Ok(rejects)
    }

    /// Samples, optionally skipping rejected ones.
    pub fn iter_samples(&self, omit_rejects: bool) -> impl Iterator<Item = &Sample> {
        self.samples
            .iter()
            .filter(move |sample| !(omit_rejects && sample.is_reject()))
    }

    pub fn samples(&self, omit_rejects: bool) -> Vec<&Sample> {
        self.iter_samples(omit_rejects).collect()
    }

    /// Change the sample at `index` in place. Class counts and the journal
    /// set are recomputed afterwards. Returns `None` when out of range.
    pub fn update<R>(&mut self, index: usize, f: impl FnOnce(&mut Sample) -> R) -> Option<R> {
        let result = f(self.samples.get_mut(index)?);
        self.recount();
        Some(result)
    }

    pub fn rejects(&self) -> Vec<&Sample> {
        self.samples.iter().filter(|s| s.is_reject()).collect()
    }

    pub fn sample_ids(&self, omit_rejects: bool) -> Vec<&str> {
        self.iter_samples(omit_rejects).map(Sample::id).collect()
    }

    pub fn documents(&self, omit_rejects: bool) -> Vec<String> {
        self.iter_samples(omit_rejects).map(Sample::document).collect()
    }

    /// Known class names, parallel to [`SampleSet::documents`].
    pub fn known_class_names(&self, omit_rejects: bool) -> Result<Vec<&'static str>> {
        self.iter_samples(omit_rejects)
            .map(|sample| sample.known_class_name().ok_or_else(|| self.unclassified()))
            .collect()
    }

    /// Known y values, parallel to [`SampleSet::documents`].
    pub fn known_y_values(&self, omit_rejects: bool) -> Result<Vec<usize>> {
        self.iter_samples(omit_rejects)
            .map(|sample| sample.known_y_value().ok_or_else(|| self.unclassified()))
            .collect()
    }

    fn unclassified(&self) -> SampleError {
        SampleError::MissingCapability {
            sample_type: self.sample_type.map(SampleType::name).unwrap_or("unbound"),
            capability: Field::KnownClassName.as_str(),
        }
    }

    pub fn num_samples(&self, omit_rejects: bool) -> usize {
        self.iter_samples(omit_rejects).count()
    }

    pub fn num_positives(&self) -> usize {
        self.num_positives
    }

    pub fn num_negatives(&self) -> usize {
        self.num_negatives
    }

    /// Distinct journal names seen, for types with a journal field.
    pub fn journals(&self) -> &BTreeSet<String> {
        &self.journals
    }

    pub fn sample_type(&self) -> Option<SampleType> {
        self.sample_type
    }

    pub fn class_names(&self) -> Option<[&'static str; 2]> {
        self.sample_type.map(SampleType::class_names)
    }

    pub fn y_positive(&self) -> Option<usize> {
        self.sample_type.map(SampleType::y_positive)
    }

    pub fn y_negative(&self) -> Option<usize> {
        self.sample_type.map(SampleType::y_negative)
    }

    pub fn field_names(&self) -> Option<&'static [Field]> {
        self.sample_type.map(SampleType::field_names)
    }

    pub fn header_line(&self) -> Option<String> {
        self.sample_type
            .map(|t| t.header_line(self.format.field_sep))
    }

    pub fn record_end(&self) -> &str {
        &self.format.record_end
    }

    pub fn field_sep(&self) -> char {
        self.format.field_sep
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    pub fn metadata(&self) -> &SampleSetMetaData {
        &self.meta
    }

    pub fn meta_item(&self, key: &str) -> Option<&str> {
        self.meta.get(key)
    }

    pub fn set_meta_item(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.meta.set(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_line_round_trip() {
        let mut meta = SampleSetMetaData::new();
        meta.set("host", "db host").set("time", "2024-01-01T00:00:00Z");
        let line = meta.to_line();
        assert_eq!(line, "#meta host=db_host time=2024-01-01T00:00:00Z");
        let parsed = SampleSetMetaData::parse(&line).unwrap();
        assert_eq!(parsed.get("host"), Some("db_host"));
        assert_eq!(parsed.iter().count(), 2);
    }

    #[test]
    fn metadata_detection() {
        assert!(SampleSetMetaData::is_meta_line("  #meta a=b"));
        assert!(!SampleSetMetaData::is_meta_line("ID|title"));
        assert!(SampleSetMetaData::parse("ID|title").is_none());
        let meta = SampleSetMetaData::parse("#meta stray a=1").unwrap();
        assert_eq!(meta.get("a"), Some("1"));
        assert_eq!(meta.iter().count(), 1);
    }

    #[test]
    fn read_binds_type_from_metadata() {
        let text = "#meta sampleObjType=PrimTriageUnClassifiedSample;;\n\
                    ID|title|abstract|extractedText;;\n\
                    1|t1|a1|x1;;\n2|t2|a2|x2;;\n";
        let mut set = SampleSet::new(None);
        set.read_text(text).unwrap();
        assert_eq!(set.sample_type(), Some(SampleType::PrimTriageUnClassified));
        assert_eq!(set.sample_ids(false), vec!["1", "2"]);
        assert_eq!(set.documents(false)[1], "t2\na2\nx2");
    }

    #[test]
    fn read_without_metadata_needs_bound_type() {
        let text = "ID|title|abstract|extractedText;;\n1|t|a|x;;\n";
        assert!(matches!(
            SampleSet::new(None).read_text(text),
            Err(SampleError::MissingSampleType)
        ));
        let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
        set.read_text(text).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn read_rejects_empty_and_headerless_input() {
        let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
        assert!(matches!(set.read_text(""), Err(SampleError::EmptyInput)));
        assert!(matches!(
            set.read_text("#meta sampleObjType=PrimTriageUnClassifiedSample;;\n"),
            Err(SampleError::EmptyInput)
        ));
    }

    #[test]
    fn read_reports_bad_record_position() {
        let text = "ID|title|abstract|extractedText;;\n1|t|a|x;;\n2|only two;;\n";
        let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
        let err = set.read_text(text).unwrap_err();
        match err {
            SampleError::Record { index, snippet, .. } => {
                assert_eq!(index, 1);
                assert_eq!(snippet, "2|only two");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn metadata_type_conflicts_with_bound_type() {
        let text = "#meta sampleObjType=CurGroupClassifiedSample;;\nheader;;\n";
        let mut set = SampleSet::new(Some(SampleType::PrimTriageClassified));
        assert!(matches!(
            set.read_text(text),
            Err(SampleError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn add_sample_enforces_type() {
        let mut set = SampleSet::new(Some(SampleType::PrimTriageClassified));
        let err = set
            .add_sample(Sample::new(SampleType::CurGroupClassified))
            .unwrap_err();
        assert!(matches!(
            err,
            SampleError::TypeMismatch {
                expected: "PrimTriageClassifiedSample",
                found: "CurGroupClassifiedSample"
            }
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn write_emits_meta_header_and_records() {
        let mut set = SampleSet::new(None);
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample.set_id("7").set_title("T");
        set.add_sample(sample).unwrap();
        set.set_meta_item("source", "unit test");

        let mut out = Vec::new();
        set.write(&mut out, WriteOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#meta source=unit_test sampleObjType=PrimTriageUnClassifiedSample;;\n\
             ID|title|abstract|extractedText;;\n7|T||;;\n"
        );

        let mut out = Vec::new();
        let bare = WriteOptions {
            write_meta: false,
            write_header: false,
            omit_rejects: false,
        };
        set.write(&mut out, bare).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7|T||;;\n");
    }

    #[test]
    fn trailing_semicolons_survive_a_round_trip() {
        let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
        for (id, text) in [("1", "ends with;"), ("2", "see Table 1;")] {
            let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
            sample.set_id(id).set_title("t;").set_extracted_text(text);
            set.add_sample(sample).unwrap();
        }
        let mut out = Vec::new();
        set.write(&mut out, WriteOptions::default()).unwrap();

        let mut loaded = SampleSet::new(None);
        loaded.read_text(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(loaded.sample_ids(false), vec!["1", "2"]);
        assert_eq!(loaded.samples(false), set.samples(false));
    }

    #[test]
    fn unwritable_sample_fails_before_output() {
        let mut set = SampleSet::new(Some(SampleType::PrimTriageUnClassified));
        for (id, title) in [("1", "fine"), ("2", "A|B")] {
            let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
            sample.set_id(id).set_title(title);
            set.add_sample(sample).unwrap();
        }
        let mut out = Vec::new();
        let err = set.write(&mut out, WriteOptions::default()).unwrap_err();
        match err {
            SampleError::Record { index, snippet, source } => {
                assert_eq!(index, 1);
                assert_eq!(snippet, "2");
                assert!(matches!(*source, SampleError::DelimiterInField { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn update_recomputes_counts_and_journals() {
        let mut set = SampleSet::new(Some(SampleType::CurGroupClassified));
        for (id, journal) in [("1", "Cell"), ("2", "Cell")] {
            let mut sample = Sample::new(SampleType::CurGroupClassified);
            sample
                .set_fields([("ID", id), ("journal", journal), ("knownClassName", "selected")])
                .unwrap();
            set.add_sample(sample).unwrap();
        }
        assert_eq!(set.num_positives(), 2);
        assert_eq!(set.journals().len(), 1);

        let changed = set.update(1, |sample| {
            sample.set_known_class_name("unselected").map(|_| ())?;
            sample.set_fields([("journal", "Nature")]).map(|_| ())
        });
        assert!(matches!(changed, Some(Ok(()))));
        assert_eq!(set.num_positives(), 1);
        assert_eq!(set.num_negatives(), 1);
        assert_eq!(set.journals().len(), 2);
        assert!(set.update(5, |_| ()).is_none());
    }

    #[test]
    fn unbound_empty_set_cannot_be_written() {
        let set = SampleSet::new(None);
        assert!(matches!(
            set.write(Vec::new(), WriteOptions::default()),
            Err(SampleError::MissingSampleType)
        ));
    }
}
