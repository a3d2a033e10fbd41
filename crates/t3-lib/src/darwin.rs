//! National Rail Darwin OpenLDBWS over SOAP.
//!
//! One `GetDepBoardWithDetails` call returns the board with each service's
//! subsequent calling points, so no per-service follow-up is needed.
//!
//! Darwin moves its element prefixes between schema versions (`lt4`, `lt5`,
//! `lt7`, `lt8`, ...), so elements are matched by local name within any Thales
//! RTTI namespace rather than by a fixed prefix/namespace pair.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use crate::clock::STATUS_ON_TIME;
use crate::config::DarwinConfig;
use crate::error::{Error, Result};
use crate::models::{locate_destination, CallingPoint, Departure, ServiceFacts};

/// Rows requested from the board.
pub const MAX_SERVICES: usize = 6;

/// Minutes ahead the board looks.
pub const TIME_WINDOW_MINS: u32 = 120;

pub const SOAP_ACTION: &str = "http://thalesgroup.com/RTTI/2017-10-01/ldb/GetDepBoardWithDetails";

const RTTI_NAMESPACE_PREFIX: &str = "http://thalesgroup.com/RTTI/";
const SOAP_11_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_12_ENVELOPE: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Build the SOAP request body for a filtered departure board.
pub fn soap_envelope(api_key: &str, origin: &str, destination: &str, rows: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:typ="http://thalesgroup.com/RTTI/2013-11-28/Token/types"
               xmlns:ldb="http://thalesgroup.com/RTTI/2017-10-01/ldb/">
  <soap:Header>
    <typ:AccessToken>
      <typ:TokenValue>{key}</typ:TokenValue>
    </typ:AccessToken>
  </soap:Header>
  <soap:Body>
    <ldb:GetDepBoardWithDetailsRequest>
      <ldb:numRows>{rows}</ldb:numRows>
      <ldb:crs>{origin}</ldb:crs>
      <ldb:filterCrs>{destination}</ldb:filterCrs>
      <ldb:filterType>to</ldb:filterType>
      <ldb:timeOffset>0</ldb:timeOffset>
      <ldb:timeWindow>{window}</ldb:timeWindow>
    </ldb:GetDepBoardWithDetailsRequest>
  </soap:Body>
</soap:Envelope>"#,
        key = xml_escape(api_key),
        rows = rows,
        origin = xml_escape(origin),
        destination = xml_escape(destination),
        window = TIME_WINDOW_MINS,
    )
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fetch the departure board from `origin` filtered to trains calling at `destination`.
pub async fn fetch_departures(
    client: &Client,
    config: &DarwinConfig,
    origin: &str,
    destination: &str,
) -> Result<Vec<Departure>> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or(Error::MissingCredential {
            what: "Darwin API key",
        })?;

    let origin = origin.to_ascii_uppercase();
    let destination = destination.to_ascii_uppercase();
    info!(origin = %origin, destination = %destination, "fetching Darwin board");

    let response = client
        .post(&config.endpoint)
        .header(CONTENT_TYPE, "text/xml; charset=utf-8")
        .header("SOAPAction", SOAP_ACTION)
        .body(soap_envelope(api_key, &origin, &destination, MAX_SERVICES))
        .send()
        .await?;

    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await?;

    if !status.is_success() {
        // Darwin reports bad tokens and bad CRS codes as a fault on HTTP 500.
        if let Some(message) = Document::parse(&body).ok().and_then(|doc| soap_fault(&doc)) {
            return Err(Error::SoapFault { message });
        }
        return Err(Error::UpstreamStatus {
            url,
            status: status.as_u16(),
        });
    }

    debug!(bytes = body.len(), "Darwin response received, parsing");
    let departures = parse_departures(&body, &destination)?;
    info!(count = departures.len(), "Darwin departures parsed");
    Ok(departures)
}

/// Parse a `GetDepBoardWithDetails` response into departures.
pub fn parse_departures(xml: &str, destination: &str) -> Result<Vec<Departure>> {
    let doc = Document::parse(xml)?;
    if let Some(message) = soap_fault(&doc) {
        return Err(Error::SoapFault { message });
    }

    let departures = doc
        .descendants()
        .filter(|n| is_rtti(n, "service"))
        .filter(|n| n.parent().is_some_and(|p| is_rtti(&p, "trainServices")))
        .filter_map(|service| {
            let departure = parse_service(service, destination);
            if departure.is_none() {
                warn!(
                    position = service.range().start,
                    "skipping service without std or etd"
                );
            }
            departure
        })
        .collect();

    Ok(departures)
}

fn parse_service(service: Node<'_, '_>, destination: &str) -> Option<Departure> {
    let std = child_text(service, "std");
    let etd = child_text(service, "etd");
    if std.is_none() && etd.is_none() {
        return None;
    }

    let is_cancelled = child_text(service, "isCancelled").is_some_and(|v| v == "true");

    let points: Vec<CallingPoint> = service
        .children()
        .filter(|n| is_rtti(n, "subsequentCallingPoints"))
        .flat_map(|n| n.children().filter(|l| is_rtti(l, "callingPointList")))
        .flat_map(|l| l.children().filter(|c| is_rtti(c, "callingPoint")))
        .map(|cp| CallingPoint {
            crs: child_text(cp, "crs").unwrap_or_default(),
            scheduled: child_text(cp, "st").unwrap_or_default(),
        })
        .collect();

    let (stops, call) = locate_destination(&points, destination);

    Some(Departure::from_facts(ServiceFacts {
        scheduled: std.unwrap_or_default(),
        expected: etd.unwrap_or_else(|| STATUS_ON_TIME.to_string()),
        cancelled: is_cancelled,
        arrival: call.map(|c| c.scheduled.clone()).filter(|s| !s.is_empty()),
        stops,
        platform: child_text(service, "platform"),
    }))
}

fn is_rtti(node: &Node<'_, '_>, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node
            .tag_name()
            .namespace()
            .is_some_and(|ns| ns.starts_with(RTTI_NAMESPACE_PREFIX))
}

fn child_text(node: Node<'_, '_>, local_name: &str) -> Option<String> {
    node.children()
        .find(|n| is_rtti(n, local_name))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extract the fault message from a SOAP 1.1 or 1.2 fault, if the body is one.
fn soap_fault(doc: &Document<'_>) -> Option<String> {
    let fault = doc.descendants().find(|n| {
        n.is_element()
            && n.tag_name().name() == "Fault"
            && matches!(
                n.tag_name().namespace(),
                Some(SOAP_11_ENVELOPE) | Some(SOAP_12_ENVELOPE)
            )
    })?;

    let message = fault
        .descendants()
        .find(|n| n.is_element() && matches!(n.tag_name().name(), "faultstring" | "Text"))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "unspecified fault".to_string());
    Some(message)
}
