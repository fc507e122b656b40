//! Media types and Accept-style preference ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use vellum_error::MediaTypeError;

const WILDCARD: &str = "*";
const QUALITY: &str = "q";

/// A parsed media type such as `text/html;charset=utf-8` or `image/*`.
///
/// Type and subtype are stored lowercased; parameter names are lowercased and
/// parameter values keep their case with surrounding quotes removed. Parameters take
/// no part in [`MediaType::includes`] or [`MediaType::is_compatible_with`].
///
/// # Examples
///
/// ```
/// use vellum_core::MediaType;
///
/// let png: MediaType = "image/png".parse().unwrap();
/// let images: MediaType = "image/*".parse().unwrap();
/// assert!(images.includes(&png));
/// assert!(!png.includes(&images));
///
/// let weighted: MediaType = "text/html;q=0.4".parse().unwrap();
/// assert_eq!(weighted.quality(), 0.4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    main_type: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    /// `*/*`
    pub fn all() -> Self {
        Self::from_parts(WILDCARD, WILDCARD)
    }

    /// `text/plain`
    pub fn text_plain() -> Self {
        Self::from_parts("text", "plain")
    }

    /// `text/html`
    pub fn text_html() -> Self {
        Self::from_parts("text", "html")
    }

    /// `application/octet-stream`
    pub fn octet_stream() -> Self {
        Self::from_parts("application", "octet-stream")
    }

    /// Build a parameterless media type from already-valid parts.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is not a valid token.
    pub fn new(main_type: &str, subtype: &str) -> Result<Self, MediaTypeError> {
        Self::parse(&format!("{}/{}", main_type, subtype))
    }

    fn from_parts(main_type: &str, subtype: &str) -> Self {
        Self {
            main_type: main_type.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// Parse a single media type.
    ///
    /// A lone `*` is accepted as shorthand for `*/*`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not `type/subtype` followed by optional
    /// `;name=value` parameters, or if a `q` parameter is not a number in `[0, 1]`.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MediaTypeError::new(input, "must not be empty"));
        }

        let mut segments = split_unquoted(trimmed, ';').into_iter();
        let full_type = segments.next().unwrap_or_default();
        let full_type = full_type.trim();
        let full_type = if full_type == WILDCARD { "*/*" } else { full_type };

        let (main_type, subtype) = full_type
            .split_once('/')
            .ok_or_else(|| MediaTypeError::new(input, "does not contain '/'"))?;
        if !is_token(main_type) {
            return Err(MediaTypeError::new(input, "type is not a valid token"));
        }
        if !is_token(subtype) {
            return Err(MediaTypeError::new(input, "subtype is not a valid token"));
        }
        if main_type == WILDCARD && subtype != WILDCARD {
            return Err(MediaTypeError::new(
                input,
                "wildcard type is legal only in '*/*'",
            ));
        }

        let mut media_type = Self::from_parts(main_type, subtype);
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| MediaTypeError::new(input, "parameter is missing '='"))?;
            let name = name.trim().to_ascii_lowercase();
            let value = unquote(value.trim());
            if !is_token(&name) {
                return Err(MediaTypeError::new(input, "parameter name is not a valid token"));
            }
            if name == QUALITY {
                match value.parse::<f64>() {
                    Ok(q) if (0.0..=1.0).contains(&q) => {}
                    _ => return Err(MediaTypeError::new(input, "q must be a number in [0, 1]")),
                }
            }
            media_type.parameters.push((name, value));
        }

        Ok(media_type)
    }

    /// Primary type, e.g. `text`.
    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    /// Subtype, e.g. `html`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Structured-syntax suffix of the subtype, e.g. `xml` for `atom+xml`.
    pub fn subtype_suffix(&self) -> Option<&str> {
        self.subtype.split_once('+').map(|(_, suffix)| suffix)
    }

    /// Look up a parameter by (case-insensitive) name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.parameters
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Quality weight from the `q` parameter, 1.0 when absent.
    pub fn quality(&self) -> f64 {
        self.parameter(QUALITY)
            .and_then(|q| q.parse().ok())
            .unwrap_or(1.0)
    }

    /// Copy of this media type without any parameters.
    pub fn essence(&self) -> Self {
        Self::from_parts(&self.main_type, &self.subtype)
    }

    /// Copy of this media type without the `q` parameter.
    pub fn without_quality(&self) -> Self {
        Self {
            main_type: self.main_type.clone(),
            subtype: self.subtype.clone(),
            parameters: self
                .parameters
                .iter()
                .filter(|(k, _)| k != QUALITY)
                .cloned()
                .collect(),
        }
    }

    /// `*/*`
    pub fn is_wildcard_type(&self) -> bool {
        self.main_type == WILDCARD
    }

    /// `type/*` or `type/*+suffix`.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD || self.subtype.starts_with("*+")
    }

    /// Neither the type nor the subtype is a wildcard.
    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard_type() && !self.is_wildcard_subtype()
    }

    /// Whether this media type, read as a pattern, covers `other`.
    ///
    /// `*/*` includes everything, `text/*` includes `text/html`, and
    /// `application/*+xml` includes `application/atom+xml`. Inclusion is not
    /// symmetric: `text/html` does not include `text/*`.
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() {
            return true;
        }
        if self.main_type != other.main_type {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if !self.is_wildcard_subtype() {
            return false;
        }
        match self.subtype.split_once('+') {
            None => true,
            Some((prefix, suffix)) => {
                prefix == WILDCARD && other.subtype_suffix() == Some(suffix)
            }
        }
    }

    /// Symmetric form of [`MediaType::includes`]: either side may be the pattern.
    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        if self.main_type != other.main_type {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if self.subtype == WILDCARD || other.subtype == WILDCARD {
            return true;
        }
        match (self.subtype_suffix(), other.subtype_suffix()) {
            (Some(ours), Some(theirs)) if self.is_wildcard_subtype() || other.is_wildcard_subtype() => {
                ours == theirs
            }
            _ => false,
        }
    }

    fn non_quality_parameter_count(&self) -> usize {
        self.parameters.iter().filter(|(k, _)| k != QUALITY).count()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.subtype)?;
        for (name, value) in &self.parameters {
            if is_token(value) {
                write!(f, ";{}={}", name, value)?;
            } else {
                write!(f, ";{}=\"{}\"", name, value)?;
            }
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaType {
    type Error = MediaTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

/// Parse a comma-separated Accept header value.
///
/// Blank entries are skipped.
///
/// # Errors
///
/// Returns the first entry that fails to parse.
///
/// # Examples
///
/// ```
/// use vellum_core::parse_accept;
///
/// let accept = parse_accept("text/html, application/json;q=0.5").unwrap();
/// assert_eq!(accept.len(), 2);
/// assert_eq!(accept[1].quality(), 0.5);
/// ```
pub fn parse_accept(header: &str) -> Result<Vec<MediaType>, MediaTypeError> {
    split_unquoted(header, ',')
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| MediaType::parse(&entry))
        .collect()
}

/// Order media types most-preferred first.
///
/// A concrete type precedes a wildcard of the same family and `*/*` trails every
/// concrete type; between unrelated types the higher `q` wins; for the same type and
/// subtype, higher `q` and then more parameters win. Entries that compare equal keep
/// the order the caller supplied.
///
/// The relation is not transitive across families (it mirrors how Accept headers
/// are conventionally ranked), so the sort is a stable insertion sort over the
/// pairwise comparison rather than `slice::sort_by`, which requires a total order.
/// Accept lists are short.
///
/// # Examples
///
/// ```
/// use vellum_core::{parse_accept, sort_by_specificity_and_quality};
///
/// let mut accept = parse_accept("application/json;q=0.5, text/html;q=0.9").unwrap();
/// sort_by_specificity_and_quality(&mut accept);
/// assert_eq!(accept[0].subtype(), "html");
/// ```
pub fn sort_by_specificity_and_quality(media_types: &mut [MediaType]) {
    for i in 1..media_types.len() {
        let mut j = i;
        while j > 0 && preference(&media_types[j - 1], &media_types[j]) == Ordering::Greater {
            media_types.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// `Less` means `a` is preferred over `b`.
fn preference(a: &MediaType, b: &MediaType) -> Ordering {
    specificity(a, b).then_with(|| quality_then_specificity(a, b))
}

fn specificity(a: &MediaType, b: &MediaType) -> Ordering {
    match (a.is_wildcard_type(), b.is_wildcard_type()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if a.main_type != b.main_type {
        return Ordering::Equal;
    }
    match (a.is_wildcard_subtype(), b.is_wildcard_subtype()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if a.subtype != b.subtype {
        return Ordering::Equal;
    }
    compare_quality(a, b).then_with(|| compare_parameter_count(a, b))
}

fn quality_then_specificity(a: &MediaType, b: &MediaType) -> Ordering {
    let by_quality = compare_quality(a, b);
    if by_quality != Ordering::Equal {
        return by_quality;
    }
    match (a.is_wildcard_type(), b.is_wildcard_type()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if a.main_type != b.main_type {
        return Ordering::Equal;
    }
    match (a.is_wildcard_subtype(), b.is_wildcard_subtype()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if a.subtype != b.subtype {
        return Ordering::Equal;
    }
    compare_parameter_count(a, b)
}

fn compare_quality(a: &MediaType, b: &MediaType) -> Ordering {
    b.quality()
        .partial_cmp(&a.quality())
        .unwrap_or(Ordering::Equal)
}

fn compare_parameter_count(a: &MediaType, b: &MediaType) -> Ordering {
    b.non_quality_parameter_count()
        .cmp(&a.non_quality_parameter_count())
}

/// RFC 7230 `token`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
        })
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

fn split_unquoted(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c == separator && !quoted => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}
