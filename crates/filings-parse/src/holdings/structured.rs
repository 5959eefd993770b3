//! Structured pass: embedded XML information tables.

use filings_core::{DiscretionBreakdown, NormalizedHolding, PutCall};
use roxmltree::{Document, Node};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Namespace of 13F information table documents.
pub const INFORMATION_TABLE_NS: &str =
    "http://www.sec.gov/edgar/document/thirteenf/informationtable";

const XML_START: &str = "<?xml";
const XML_END: &str = "</XML>";

/// Outcome of the structured pass over one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredPass {
    /// Valid holdings, in document order.
    pub holdings: Vec<NormalizedHolding>,
    /// Embedded XML documents found.
    pub markers: usize,
    /// Embedded XML documents that parsed.
    pub documents: usize,
    /// Last XML parse error, if any document failed to parse.
    pub parse_error: Option<String>,
}

impl StructuredPass {
    /// Explains why the pass produced no holdings.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match (&self.parse_error, self.markers, self.documents) {
            (_, 0, _) => "no embedded XML document".to_string(),
            (Some(e), _, 0) => format!("embedded XML could not be parsed: {e}"),
            _ => format!(
                "no information table entries in {} XML document(s)",
                self.documents
            ),
        }
    }
}

/// Reads every embedded XML document in `text` and collects its
/// information table entries.
///
/// Each document runs from an XML declaration to the next `</XML>` wrapper
/// tag, or to the end of the text. Documents that fail to parse are skipped.
/// Entries without a well-formed CUSIP or an issuer name are dropped.
#[must_use]
pub fn parse(text: &str) -> StructuredPass {
    let mut pass = StructuredPass::default();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(XML_START) {
        let start = cursor + offset;
        let end = text[start..]
            .find(XML_END)
            .map_or(text.len(), |i| start + i);
        cursor = end;
        pass.markers += 1;

        let fragment = text[start..end].trim_end();
        match Document::parse(fragment) {
            Ok(document) => {
                pass.documents += 1;
                collect(&document, &mut pass.holdings);
            }
            Err(e) => {
                debug!(error = %e, offset = start, "Embedded XML document failed to parse");
                pass.parse_error = Some(e.to_string());
            }
        }

        if cursor >= text.len() {
            break;
        }
    }

    pass
}

fn collect(document: &Document<'_>, holdings: &mut Vec<NormalizedHolding>) {
    for entry in document
        .descendants()
        .filter(|n| is_element(n, "infoTable"))
    {
        let holding = read_entry(entry);
        if holding.is_valid() {
            holdings.push(holding);
        } else {
            debug!(cusip = %holding.cusip, issuer = %holding.issuer_name, "Dropping invalid information table entry");
        }
    }
}

fn read_entry(entry: Node<'_, '_>) -> NormalizedHolding {
    let mut holding = NormalizedHolding::new(
        field(entry, "cusip").unwrap_or_default(),
        field(entry, "nameOfIssuer").unwrap_or_default(),
    );

    holding.title_of_class = field(entry, "titleOfClass").map(str::to_string);
    holding.market_value = number(field(entry, "value"));
    holding.shares = number(field(entry, "sshPrnamt"));
    holding.share_type = field(entry, "sshPrnamtType").map(str::to_string);
    holding.put_call = field(entry, "putCall").map_or(PutCall::Neither, PutCall::parse);
    holding.investment_discretion = field(entry, "investmentDiscretion").map(str::to_string);
    holding.discretion = DiscretionBreakdown {
        sole: number(field(entry, "Sole")),
        shared: number(field(entry, "Shared")),
        none: number(field(entry, "None")),
    };

    holding
}

fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(INFORMATION_TABLE_NS)
}

/// Trimmed text of the first descendant element named `name`, if non-empty.
fn field<'a>(entry: Node<'a, '_>, name: &str) -> Option<&'a str> {
    entry
        .descendants()
        .find(|n| is_element(n, name))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parses a reported number; missing or malformed values are zero.
fn number(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };
    let cleaned = raw.replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or_else(|_| {
            debug!(value = raw, "Unparseable number in information table");
            Decimal::ZERO
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<informationTable xmlns="{INFORMATION_TABLE_NS}">{entries}</informationTable>"#
        )
    }

    #[test]
    fn test_minimal_entry() {
        let text = table(
            r#"<infoTable>
                <nameOfIssuer>Apple Inc</nameOfIssuer>
                <cusip>037833100</cusip>
                <value>1000</value>
                <shrsOrPrnAmt><sshPrnamt>500</sshPrnamt></shrsOrPrnAmt>
            </infoTable>"#,
        );
        let pass = parse(&text);

        assert_eq!(pass.markers, 1);
        assert_eq!(pass.documents, 1);
        assert_eq!(pass.holdings.len(), 1);
        let h = &pass.holdings[0];
        assert_eq!(h.cusip, "037833100");
        assert_eq!(h.issuer_name, "Apple Inc");
        assert_eq!(h.market_value, Decimal::from(1000));
        assert_eq!(h.shares, Decimal::from(500));
        assert_eq!(h.put_call, PutCall::Neither);
        assert_eq!(h.discretion, DiscretionBreakdown::default());
    }

    #[test]
    fn test_all_fields_with_prefixed_namespace() {
        let text = format!(
            r#"<?xml version="1.0"?>
<ns1:informationTable xmlns:ns1="{INFORMATION_TABLE_NS}">
  <ns1:infoTable>
    <ns1:nameOfIssuer>TESLA INC</ns1:nameOfIssuer>
    <ns1:titleOfClass>COM</ns1:titleOfClass>
    <ns1:cusip>88160r101</ns1:cusip>
    <ns1:value>2,500</ns1:value>
    <ns1:shrsOrPrnAmt>
      <ns1:sshPrnamt>10,000</ns1:sshPrnamt>
      <ns1:sshPrnamtType>SH</ns1:sshPrnamtType>
    </ns1:shrsOrPrnAmt>
    <ns1:putCall>Call</ns1:putCall>
    <ns1:investmentDiscretion>DFND</ns1:investmentDiscretion>
    <ns1:votingAuthority>
      <ns1:Sole>6000</ns1:Sole>
      <ns1:Shared>3000</ns1:Shared>
      <ns1:None>1000</ns1:None>
    </ns1:votingAuthority>
  </ns1:infoTable>
</ns1:informationTable>"#
        );
        let pass = parse(&text);
        let h = &pass.holdings[0];

        assert_eq!(h.cusip, "88160R101");
        assert_eq!(h.title_of_class.as_deref(), Some("COM"));
        assert_eq!(h.market_value, Decimal::from(2500));
        assert_eq!(h.shares, Decimal::from(10_000));
        assert_eq!(h.share_type.as_deref(), Some("SH"));
        assert_eq!(h.put_call, PutCall::Call);
        assert_eq!(h.investment_discretion.as_deref(), Some("DFND"));
        assert_eq!(h.discretion.sole, Decimal::from(6000));
        assert_eq!(h.discretion.shared, Decimal::from(3000));
        assert_eq!(h.discretion.none, Decimal::from(1000));
    }

    #[test]
    fn test_wrong_namespace_is_ignored() {
        let text = r#"<?xml version="1.0"?>
<informationTable xmlns="urn:other">
  <infoTable><nameOfIssuer>Apple Inc</nameOfIssuer><cusip>037833100</cusip></infoTable>
</informationTable>"#;
        let pass = parse(text);
        assert_eq!(pass.documents, 1);
        assert!(pass.holdings.is_empty());
        assert!(pass.failure_reason().starts_with("no information table entries"));
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let text = table(
            r#"<infoTable><nameOfIssuer>No Cusip Corp</nameOfIssuer></infoTable>
               <infoTable><cusip>037833100</cusip></infoTable>
               <infoTable><nameOfIssuer>Short Cusip</nameOfIssuer><cusip>12345</cusip></infoTable>
               <infoTable><nameOfIssuer>Good Corp</nameOfIssuer><cusip>594918104</cusip>
                 <value>n/a</value></infoTable>"#,
        );
        let pass = parse(&text);
        assert_eq!(pass.holdings.len(), 1);
        assert_eq!(pass.holdings[0].issuer_name, "Good Corp");
        assert_eq!(pass.holdings[0].market_value, Decimal::ZERO);
    }

    #[test]
    fn test_skips_primary_document_and_broken_fragments() {
        let text = format!(
            "<XML>\n<?xml version=\"1.0\"?>\n<edgarSubmission xmlns=\"urn:primary\"><cover/></edgarSubmission>\n</XML>\n\
             <XML>\n<?xml version=\"1.0\"?>\n<broken>\n</XML>\n\
             <XML>\n{}\n</XML>",
            table(
                "<infoTable><nameOfIssuer>Microsoft Corp</nameOfIssuer><cusip>594918104</cusip></infoTable>"
            )
        );
        let pass = parse(&text);

        assert_eq!(pass.markers, 3);
        assert_eq!(pass.documents, 2);
        assert!(pass.parse_error.is_some());
        assert_eq!(pass.holdings.len(), 1);
        assert_eq!(pass.holdings[0].cusip, "594918104");
    }

    #[test]
    fn test_failure_reasons() {
        assert_eq!(parse("plain text").failure_reason(), "no embedded XML document");
        assert!(
            parse("<?xml version=\"1.0\"?><a><b></a>")
                .failure_reason()
                .starts_with("embedded XML could not be parsed")
        );
    }
}
