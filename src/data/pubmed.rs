//! PubMed ingestion via E-utilities, producing unclassified samples.

use anyhow::{Context, Result};
use chrono::Utc;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use urlencoding::encode;

use crate::{
    config::{RecordFormat, Settings},
    data::{
        rows::RowCleaning,
        sample::{Field, Sample, SampleType},
        sample_set::SampleSet,
    },
};

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const EFETCH_BATCH: usize = 200;

/// Article fields pulled from a PubMed record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PubRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub journal: Option<String>,
    pub year: Option<i32>,
}

pub async fn search_pubmed(query: &str, max: usize, settings: &Settings) -> Result<Vec<String>> {
    if query.trim().is_empty() {
        return Ok(vec![]);
    }
    let client = http_client(settings)?;
    let url = format!(
        "{base}/esearch.fcgi?db=pubmed&retmode=json&term={term}&retmax={max}&tool={tool}&email={email}",
        base = EUTILS_BASE,
        term = encode(query),
        max = max,
        tool = encode(&settings.pubmed_tool),
        email = encode(&settings.pubmed_email)
    );
    let resp = client.get(url).send().await?.error_for_status()?;
    let payload: ESearchResponse = resp.json().await.context("decoding esearch response")?;
    debug!(count = payload.esearchresult.idlist.len(), "esearch ids");
    Ok(payload.esearchresult.idlist)
}

pub async fn fetch_pubmed(pmids: &[String], settings: &Settings) -> Result<Vec<PubRecord>> {
    if pmids.is_empty() {
        return Ok(Vec::new());
    }
    let client = http_client(settings)?;
    let mut output = Vec::new();
    for chunk in pmids.chunks(EFETCH_BATCH) {
        let url = format!(
            "{base}/efetch.fcgi?db=pubmed&rettype=abstract&retmode=xml&id={ids}&tool={tool}&email={email}",
            base = EUTILS_BASE,
            ids = chunk.join(","),
            tool = encode(&settings.pubmed_tool),
            email = encode(&settings.pubmed_email)
        );
        let xml = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        output.extend(parse_article_set(&xml)?);
    }
    info!(requested = pmids.len(), fetched = output.len(), "fetched pubmed records");
    Ok(output)
}

/// Parse an efetch `PubmedArticleSet` document.
pub fn parse_article_set(xml: &str) -> Result<Vec<PubRecord>> {
    let article_set: PubmedArticleSet = from_str(xml).context("parsing efetch xml")?;
    Ok(article_set
        .articles
        .into_iter()
        .map(PubmedArticle::into_record)
        .collect())
}

/// Unclassified sample set from fetched records. Text is cleaned for the
/// sample file format; extracted text stays empty.
pub fn records_to_sample_set(records: &[PubRecord], query: &str) -> crate::error::Result<SampleSet> {
    let cleaning = RowCleaning::default();
    let mut set = SampleSet::with_format(
        Some(SampleType::PrimTriageUnClassified),
        RecordFormat::default(),
    );
    for record in records {
        let mut sample = Sample::new(SampleType::PrimTriageUnClassified);
        sample
            .set_field(Field::Id, &record.pmid)?
            .set_field(Field::Title, &cleaning.clean_text(&record.title))?
            .set_field(Field::Abstract, &cleaning.clean_text(&record.abstract_text))?;
        set.add_sample(sample)?;
    }
    set.set_meta_item("source", "pubmed")
        .set_meta_item("query", query)
        .set_meta_item("time", Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    Ok(set)
}

fn http_client(settings: &Settings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(format!("lit-triage/0.1 (+{})", settings.pubmed_email))
        .gzip(true)
        .brotli(true)
        .build()?)
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize, Default)]
struct ESearchResult {
    #[serde(default, rename = "idlist")]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticle>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticle {
    #[serde(rename = "MedlineCitation")]
    citation: MedlineCitation,
}

impl PubmedArticle {
    fn into_record(self) -> PubRecord {
        let article = self.citation.article;
        let abstract_text = article
            .abstract_section
            .map(|abs| {
                abs.text
                    .into_iter()
                    .filter_map(|t| t.value)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        let (journal, year) = match article.journal {
            Some(journal) => (
                journal.title.map(|t| t.value),
                journal
                    .issue
                    .and_then(|issue| issue.pub_date)
                    .and_then(|date| date.year)
                    .and_then(|y| y.value.trim().parse().ok()),
            ),
            None => (None, None),
        };

        PubRecord {
            pmid: self.citation.pmid.value,
            title: article.title.map(|t| t.value).unwrap_or_default(),
            abstract_text,
            journal,
            year,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MedlineCitation {
    #[serde(rename = "PMID")]
    pmid: TextNode,
    #[serde(rename = "Article")]
    article: Article,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(rename = "ArticleTitle")]
    title: Option<TextNode>,
    #[serde(rename = "Abstract")]
    abstract_section: Option<Abstract>,
    #[serde(rename = "Journal")]
    journal: Option<Journal>,
}

#[derive(Debug, Deserialize)]
struct Abstract {
    #[serde(rename = "AbstractText", default)]
    text: Vec<AbstractText>,
}

#[derive(Debug, Deserialize)]
struct AbstractText {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Journal {
    #[serde(rename = "Title")]
    title: Option<TextNode>,
    #[serde(rename = "JournalIssue")]
    issue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
struct PubDate {
    #[serde(rename = "Year")]
    year: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text")]
    value: String,
}
