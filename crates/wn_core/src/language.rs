use serde::{Deserialize, Serialize};
use std::fmt;
use whatlang::Lang;

/// Language tag for comment text.
///
/// WaldNet comments mix Dutch and West Frisian. whatlang carries no Frisian
/// model, so detection is two-valued: Dutch maps to `Nl`, everything else
/// (Frisian included, whatever whatlang mistakes it for) maps to `Fr`.
/// `Unknown` is reserved for comments that had no text to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "NL")]
    Nl,
    #[serde(rename = "FR")]
    Fr,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Nl => "NL",
            Language::Fr => "FR",
            Language::Unknown => "Unknown",
        }
    }

    /// Inverse of `as_str`, for rows read back from storage. Anything
    /// unrecognized becomes `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NL" => Language::Nl,
            "FR" => Language::Fr,
            _ => Language::Unknown,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a comment's text. Total: empty input, undetectable input and
/// ambiguous short strings all fall back to `Fr`, never an error and never
/// `Unknown`. Only a confident Dutch detection yields `Nl`; Frisian reads as
/// near-Dutch to a trigram detector, so an unsure "Dutch" is more likely
/// Frisian.
pub fn classify(text: &str) -> Language {
    match whatlang::detect(text) {
        Some(info) if info.lang() == Lang::Nld && info.is_reliable() => Language::Nl,
        _ => Language::Fr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dutch() {
        let text = "De brandweer heeft het vuur in de woning aan de Schrans geblust. \
                    Volgens de politie raakte niemand gewond, maar de schade aan het \
                    gebouw is aanzienlijk en de bewoners zijn elders ondergebracht.";
        assert_eq!(classify(text), Language::Nl);
    }

    #[test]
    fn test_classify_frisian_falls_back() {
        assert_eq!(classify("Wat in ferskriklike brân"), Language::Fr);
    }

    #[test]
    fn test_classify_empty_is_frisian() {
        assert_eq!(classify(""), Language::Fr);
    }

    #[test]
    fn test_classify_never_unknown() {
        for text in ["", "ok", "123", "?!", "brân"] {
            assert_ne!(classify(text), Language::Unknown);
        }
    }

    #[test]
    fn test_tag_round_trip() {
        for lang in [Language::Nl, Language::Fr, Language::Unknown] {
            assert_eq!(Language::from_tag(lang.as_str()), lang);
        }
        assert_eq!(Language::from_tag("nonsense"), Language::Unknown);
    }
}
