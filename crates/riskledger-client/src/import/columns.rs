use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ColumnMappingError;

const EXACT_MATCH_BASE: u32 = 1000;
const PREFIX_MATCH_BASE: u32 = 500;
const SUBSTRING_MATCH_BASE: u32 = 200;
const MIN_SUBSTRING_KEYWORD_LEN: usize = 4;

const DATE_KEYWORDS: &[&str] = &[
    "date",
    "transaction date",
    "txn date",
    "trans date",
    "value date",
    "posting date",
    "posted date",
    "booking date",
    "posted_at",
    "datetime",
    "timestamp",
    "time",
    "dt",
];

const AMOUNT_KEYWORDS: &[&str] = &[
    "amount",
    "amt",
    "transaction amount",
    "txn amount",
    "net amount",
    "sum",
    "total",
];

const DEBIT_KEYWORDS: &[&str] = &[
    "debit",
    "withdrawal",
    "withdrawals",
    "dr",
    "debit amount",
    "withdrawal amt",
    "money out",
    "paid out",
    "outflow",
    "spent",
];

const CREDIT_KEYWORDS: &[&str] = &[
    "credit",
    "deposit",
    "deposits",
    "cr",
    "credit amount",
    "deposit amt",
    "money in",
    "paid in",
    "inflow",
    "received",
];

const DESCRIPTION_KEYWORDS: &[&str] = &[
    "description",
    "narration",
    "particulars",
    "details",
    "memo",
    "remarks",
    "merchant",
    "payee",
    "transaction details",
    "note",
    "notes",
    "reference",
];

const CATEGORY_KEYWORDS: &[&str] = &[
    "category",
    "type",
    "transaction type",
    "txn type",
    "class",
    "group",
    "tag",
];

const TRANSACTION_ID_KEYWORDS: &[&str] = &[
    "transaction id",
    "txn id",
    "transaction_id",
    "txn_id",
    "id",
    "reference number",
    "ref no",
    "ref",
    "utr",
    "cheque no",
    "chq no",
];

/// Abstract transaction attribute located among arbitrary source headers.
///
/// Declaration order is the assignment order: a header that could serve two
/// fields goes to whichever is declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticField {
    Date,
    Amount,
    Debit,
    Credit,
    Description,
    Category,
    TransactionId,
}

impl SemanticField {
    pub const ALL: [SemanticField; 7] = [
        Self::Date,
        Self::Amount,
        Self::Debit,
        Self::Credit,
        Self::Description,
        Self::Category,
        Self::TransactionId,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Description => "description",
            Self::Category => "category",
            Self::TransactionId => "transactionId",
        }
    }

    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Date => DATE_KEYWORDS,
            Self::Amount => AMOUNT_KEYWORDS,
            Self::Debit => DEBIT_KEYWORDS,
            Self::Credit => CREDIT_KEYWORDS,
            Self::Description => DESCRIPTION_KEYWORDS,
            Self::Category => CATEGORY_KEYWORDS,
            Self::TransactionId => TRANSACTION_ID_KEYWORDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    fields: BTreeMap<SemanticField, String>,
}

impl ColumnMapping {
    pub fn get(&self, field: SemanticField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: SemanticField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticField, &str)> {
        self.fields
            .iter()
            .map(|(field, header)| (*field, header.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn insert(&mut self, field: SemanticField, header: &str) {
        self.fields.insert(field, header.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDetection {
    pub mapping: ColumnMapping,
    pub has_debit_credit: bool,
    pub unused_headers: Vec<String>,
}

pub fn detect_columns(headers: &[String]) -> Result<ColumnDetection, ColumnMappingError> {
    let normalized = headers
        .iter()
        .map(|header| normalize_header(header))
        .collect::<Vec<String>>();
    let mut used = vec![false; headers.len()];
    let mut mapping = ColumnMapping::default();

    for field in SemanticField::ALL {
        let mut best: Option<(usize, u32)> = None;
        for (index, header) in normalized.iter().enumerate() {
            if used[index] {
                continue;
            }
            let score = header_score(header, field.keywords());
            if score == 0 {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        if let Some((index, _)) = best {
            used[index] = true;
            mapping.insert(field, &headers[index]);
        }
    }

    let missing = missing_fields(&mapping);
    if !missing.is_empty() {
        log::warn!(
            "column detection failed: missing {} among {} headers",
            missing.join(", "),
            headers.len()
        );
        return Err(ColumnMappingError {
            missing,
            detected_headers: headers.to_vec(),
            suggestion: suggestion_text(),
        });
    }

    let has_debit_credit =
        mapping.contains(SemanticField::Debit) || mapping.contains(SemanticField::Credit);
    let unused_headers = headers
        .iter()
        .zip(used.iter())
        .filter(|(_, taken)| !**taken)
        .map(|(header, _)| header.clone())
        .collect::<Vec<String>>();

    log::info!(
        "column mapping: {} (debit/credit: {has_debit_credit}, unused: {})",
        describe_mapping(&mapping),
        unused_headers.len()
    );

    Ok(ColumnDetection {
        mapping,
        has_debit_credit,
        unused_headers,
    })
}

/// Score of one header against one keyword at `keyword_index` in its field's
/// priority list. Zero means no match.
pub fn match_score(header: &str, keyword: &str, keyword_index: usize) -> u32 {
    let penalty = u32::try_from(keyword_index).unwrap_or(u32::MAX);

    if header == keyword {
        return EXACT_MATCH_BASE.saturating_sub(penalty);
    }

    if let Some(rest) = header.strip_prefix(keyword)
        && (rest.starts_with('_') || rest.starts_with(' '))
    {
        return PREFIX_MATCH_BASE.saturating_sub(penalty);
    }

    if keyword.chars().count() >= MIN_SUBSTRING_KEYWORD_LEN && header.contains(keyword) {
        return SUBSTRING_MATCH_BASE.saturating_sub(penalty);
    }

    0
}

fn header_score(header: &str, keywords: &[&str]) -> u32 {
    keywords
        .iter()
        .enumerate()
        .map(|(index, keyword)| match_score(header, keyword, index))
        .max()
        .unwrap_or(0)
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn missing_fields(mapping: &ColumnMapping) -> Vec<String> {
    let mut missing = Vec::new();
    if !mapping.contains(SemanticField::Date) {
        missing.push(SemanticField::Date.as_str().to_string());
    }

    let has_money_column = [
        SemanticField::Amount,
        SemanticField::Debit,
        SemanticField::Credit,
    ]
    .iter()
    .any(|field| mapping.contains(*field));
    if !has_money_column {
        missing.push("amount or debit/credit".to_string());
    }
    missing
}

fn suggestion_text() -> String {
    "Make sure the file has a date column (e.g. \"Date\" or \"Transaction Date\") and either an \
     amount column (e.g. \"Amount\") or separate debit/credit columns (e.g. \"Debit\", \"Credit\")."
        .to_string()
}

fn describe_mapping(mapping: &ColumnMapping) -> String {
    mapping
        .iter()
        .map(|(field, header)| format!("{}={header:?}", field.as_str()))
        .collect::<Vec<String>>()
        .join(", ")
}
