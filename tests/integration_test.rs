//! Integration tests for the zentinel-wsman-soap crate.
//!
//! These tests exercise the public API surface end-to-end, combining
//! parsing, validation, header assembly, and serialization together.

use zentinel_wsman_soap::config::SoapConfig;
use zentinel_wsman_soap::error::{ErrorKind, ParseError};
use zentinel_wsman_soap::namespaces::{self, ADDRESSING, MUST_UNDERSTAND, WSMAN, XML_LANG};
use zentinel_wsman_soap::parser::parse_document;
use zentinel_wsman_soap::writer::WriteOptions;
use zentinel_wsman_soap::{
    is_soap, Element, Fault, HeaderBuilder, HeaderOption, Message, QName, SoapError,
    CONTENT_TYPE,
};

// ============================================================================
// Helpers
// ============================================================================

const FROB: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Header>
    <Action s:mustUnderstand="true">Frob</Action>
    <To s:mustUnderstand="true">this</To>
  </s:Header>
  <s:Body>
    <Frob>
      <OptimizeFrobnication/>
      <MaxFrobs>999</MaxFrobs>
    </Frob>
  </s:Body>
</s:Envelope>"#;

fn header_names(msg: &Message) -> Vec<String> {
    msg.headers()
        .iter()
        .map(|&id| msg.node(id).name().local().to_string())
        .collect()
}

fn kind_of(xml: &str) -> ErrorKind {
    Message::parse(xml.as_bytes()).unwrap_err().kind()
}

// ============================================================================
// End-to-end: envelope validation
// ============================================================================

#[test]
fn test_e2e_envelope_rejections() {
    let env = r#"xmlns:s="http://www.w3.org/2003/05/soap-envelope""#;

    assert_eq!(kind_of(r#"<?xml version="1.0"?>"#), ErrorKind::NoEnvelope);
    assert_eq!(
        kind_of(&format!("<s:Root {env}><s:Header/><s:Body/></s:Root>")),
        ErrorKind::BadEnvelope
    );
    assert_eq!(
        kind_of(&format!("<s:Envelope {env}><s:Header/><s:Body/><s:Body/></s:Envelope>")),
        ErrorKind::EnvelopeOverstuffed
    );
    assert_eq!(
        kind_of(&format!("<s:Envelope {env}><s:Header/><s:Header/></s:Envelope>")),
        ErrorKind::TooManyHeader
    );
    assert_eq!(
        kind_of(&format!("<s:Envelope {env}><s:Body/><s:Body/></s:Envelope>")),
        ErrorKind::TooManyBody
    );
    assert_eq!(
        kind_of(&format!("<s:Envelope {env}><Body/></s:Envelope>")),
        ErrorKind::BadTag
    );
}

#[test]
fn test_e2e_soap_11_envelope_is_bad_envelope() {
    let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body/>
</soap:Envelope>"#;
    let err = Message::parse(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, SoapError::BadEnvelope));
    assert_eq!(err.to_string(), "Invalid SOAP: Root should be an Envelope");
}

#[test]
fn test_e2e_missing_sections_are_synthesized() {
    let xml = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"/>"#;
    let msg = Message::parse(xml.as_bytes()).unwrap();
    assert!(msg.headers().is_empty());
    assert!(msg.body().is_empty());

    let out = msg.to_xml().unwrap();
    let again = Message::parse(out.as_bytes()).unwrap();
    let root = again.document().root().unwrap();
    assert_eq!(again.document().children(root).len(), 2);
}

#[test]
fn test_e2e_is_soap_on_prebuilt_document() {
    let doc = parse_document(FROB.as_bytes()).unwrap();
    let msg = is_soap(doc).unwrap();
    assert_eq!(header_names(&msg), vec!["Action", "To"]);
}

// ============================================================================
// End-to-end: malformed input
// ============================================================================

#[test]
fn test_e2e_doctype_rejected() {
    let xml = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body>&xxe;</s:Body></s:Envelope>"#;
    let err = Message::parse(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, SoapError::Parse(ParseError::DoctypeForbidden)));
    assert_eq!(err.kind(), ErrorKind::InvalidXml);
    assert!(!err.is_validation());
}

#[test]
fn test_e2e_unbound_prefix_rejected() {
    let err = Message::parse(b"<s:Envelope><s:Body/></s:Envelope>").unwrap_err();
    assert!(matches!(err, SoapError::Parse(ParseError::UnboundPrefix(_))));
}

#[test]
fn test_e2e_truncated_document_rejected() {
    let xml = &FROB[..FROB.len() - 20];
    let err = Message::parse(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, SoapError::Parse(_)));
}

// ============================================================================
// End-to-end: header and body manipulation
// ============================================================================

#[test]
fn test_e2e_frob_scenario() {
    let mut msg = Message::from_reader(FROB.as_bytes()).unwrap();
    assert_eq!(header_names(&msg), vec!["Action", "To"]);
    assert_eq!(msg.body().len(), 1);

    let action = msg
        .get_header(&Element::new(QName::unqualified("Action")).must_understand(true))
        .unwrap();
    assert_eq!(msg.text(action), Some("Frob"));

    let to = msg.get_header(&Element::new(QName::unqualified("To"))).unwrap();
    assert_eq!(msg.remove_header(to), Some(to));
    assert_eq!(header_names(&msg), vec!["Action"]);

    let max = msg
        .all_body_elements()
        .into_iter()
        .find(|&id| msg.node(id).name().local() == "MaxFrobs")
        .unwrap();
    assert_eq!(msg.text(max), Some("999"));
}

#[test]
fn test_e2e_edit_and_reserialize() {
    let mut msg = Message::parse(FROB.as_bytes()).unwrap();
    msg.set_header([
        Element::new(QName::unqualified("Action"))
            .must_understand(true)
            .with_text("Unfrob"),
        Element::in_ns(&WSMAN, "OperationTimeout").with_text("PT5S"),
    ]);
    let frob = msg.body()[0];
    msg.remove_body(frob);
    msg.set_body([Element::new(QName::unqualified("Unfrob"))]);

    let out = msg.to_xml().unwrap();
    let again = Message::parse(out.as_bytes()).unwrap();
    assert_eq!(header_names(&again), vec!["Action", "To", "OperationTimeout"]);
    assert_eq!(again.text(again.headers()[0]), Some("Unfrob"));
    assert!(again.node(again.headers()[0]).must_understand());
    assert_eq!(again.body().len(), 1);
    assert_eq!(again.node(again.body()[0]).name().local(), "Unfrob");
}

// ============================================================================
// End-to-end: WS-Management request assembly
// ============================================================================

#[test]
fn test_e2e_winrm_create_shell_request() {
    let config = SoapConfig::default();
    let mut msg = HeaderBuilder::new(Message::new())
        .with_defaults(&config.headers)
        .to("http://windows-host:5985/wsman")
        .reply_to("http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous")
        .id("uuid:0AB58087-C2C3-0005-0000-000000010000")
        .action("http://schemas.xmlsoap.org/ws/2004/09/transfer/Create")
        .resource_uri("http://schemas.microsoft.com/wbem/wsman/1/windows/shell/cmd")
        .add_option(HeaderOption::new("WINRS_NOPROFILE", "FALSE"))
        .add_option(HeaderOption::new("WINRS_CODEPAGE", "437"))
        .build();
    msg.set_body([Element::new(QName::new(
        "http://schemas.microsoft.com/wbem/wsman/1/windows/shell",
        "Shell",
    ))]);

    let xml = msg
        .to_xml_with(&WriteOptions::from(&config.serialization))
        .unwrap();
    assert!(xml.starts_with("<?xml"));

    let parsed = Message::parse(xml.as_bytes()).unwrap();
    assert_eq!(
        header_names(&parsed),
        vec![
            "To",
            "ReplyTo",
            "MaxEnvelopeSize",
            "OperationTimeout",
            "MessageID",
            "Locale",
            "Action",
            "ResourceURI",
            "OptionSet",
        ]
    );

    let action = parsed
        .get_header(&Element::in_ns(&ADDRESSING, "Action").must_understand(true))
        .unwrap();
    assert_eq!(
        parsed.text(action),
        Some("http://schemas.xmlsoap.org/ws/2004/09/transfer/Create")
    );

    let locale = parsed
        .get_header(&Element::in_ns(&WSMAN, "Locale").with_attr(XML_LANG, "en-US"))
        .unwrap();
    assert_eq!(parsed.node(locale).attr(&MUST_UNDERSTAND), Some("false"));

    let to = parsed.get_header(&Element::in_ns(&ADDRESSING, "To")).unwrap();
    assert_eq!(parsed.node(to).attr(&MUST_UNDERSTAND), None);
}

#[test]
fn test_e2e_shell_selector_lookup() {
    let msg = HeaderBuilder::new(Message::new())
        .to("http://host/wsman")
        .action("http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Command")
        .shell_id("11111111-2222-3333-4444-555555555555")
        .build();

    let xml = msg.to_xml().unwrap();
    let parsed = Message::parse(xml.as_bytes()).unwrap();
    let selector = parsed
        .all_header_elements()
        .into_iter()
        .find(|&id| {
            Element::in_ns(&WSMAN, "Selector")
                .with_attr(QName::unqualified("Name"), "ShellId")
                .matches(parsed.node(id))
        })
        .unwrap();
    assert_eq!(
        parsed.text(selector),
        Some("11111111-2222-3333-4444-555555555555")
    );
}

#[test]
fn test_e2e_skeleton_uses_registered_prefixes() {
    let msg = HeaderBuilder::new(Message::new())
        .to("x")
        .action("y")
        .build();
    let xml = msg
        .to_xml_with(&WriteOptions {
            write_declaration: false,
            ..WriteOptions::default()
        })
        .unwrap();

    assert!(xml.starts_with("<s:Envelope"));
    assert!(xml.contains(&format!("xmlns:wsa=\"{}\"", ADDRESSING.uri())));
    assert!(xml.contains(&format!("xmlns:wsman=\"{}\"", WSMAN.uri())));
    assert!(xml.contains("<wsa:To>x</wsa:To>"));
    assert!(xml.contains("<wsa:Action s:mustUnderstand=\"true\">y</wsa:Action>"));
}

// ============================================================================
// End-to-end: faults
// ============================================================================

#[test]
fn test_e2e_fault_round_trip() {
    let mut msg = HeaderBuilder::new(Message::new())
        .to("http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous")
        .action("http://schemas.dmtf.org/wbem/wsman/1/wsman/fault")
        .build();
    msg.set_fault(
        &Fault::sender("The service cannot find the resource identified by the resource URI and selectors.")
            .with_subcode(WSMAN.name("DestinationUnreachable")),
    );

    let xml = msg.to_xml().unwrap();
    let parsed = Message::parse(xml.as_bytes()).unwrap();
    assert!(parsed.fault().is_some());

    let fault = Fault::from_message(&parsed).unwrap();
    assert_eq!(fault.code, "Sender");
    assert_eq!(fault.subcodes, vec![WSMAN.name("DestinationUnreachable")]);
    assert!(fault.reason.starts_with("The service cannot find"));
}

#[test]
fn test_e2e_peer_fault_relayed_with_foreign_prefix() {
    let peer = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault xmlns:p="urn:peer:faults">
      <env:Code>
        <env:Value>env:Receiver</env:Value>
        <env:Subcode><env:Value>p:Overloaded</env:Value></env:Subcode>
      </env:Code>
      <env:Reason><env:Text xml:lang="en">busy</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;
    let fault = Fault::from_message(&Message::parse(peer.as_bytes()).unwrap()).unwrap();
    assert_eq!(fault.code, "Receiver");
    assert_eq!(fault.subcodes, vec![QName::new("urn:peer:faults", "Overloaded")]);

    let mut reply = Message::new();
    reply.set_fault(&fault);
    let xml = reply.to_xml().unwrap();
    assert!(xml.contains("=\"urn:peer:faults\""));

    let relayed = Fault::from_message(&Message::parse(xml.as_bytes()).unwrap()).unwrap();
    assert_eq!(relayed, fault);
}

#[test]
fn test_e2e_plain_body_has_no_fault() {
    let msg = Message::parse(FROB.as_bytes()).unwrap();
    assert!(msg.fault().is_none());
    assert!(Fault::from_message(&msg).is_none());
}

// ============================================================================
// End-to-end: text and nesting limits
// ============================================================================

#[test]
fn test_e2e_padded_text_survives_round_trip() {
    let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Body>
    <Data>  padded  </Data>
  </s:Body>
</s:Envelope>"#;
    let msg = Message::parse(xml.as_bytes()).unwrap();
    let data = msg.body()[0];
    assert_eq!(msg.text(data), Some("  padded  "));

    let again = Message::parse(msg.to_xml().unwrap().as_bytes()).unwrap();
    assert_eq!(again.text(again.body()[0]), Some("  padded  "));
}

#[test]
fn test_e2e_deeply_nested_body_is_rejected() {
    let depth = 200_000;
    let mut xml = String::from(r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body>"#);
    xml.push_str(&"<d>".repeat(depth));
    xml.push_str(&"</d>".repeat(depth));
    xml.push_str("</s:Body></s:Envelope>");

    let err = Message::parse(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, SoapError::Parse(ParseError::TooDeep(_))));
    assert_eq!(err.kind(), ErrorKind::InvalidXml);
}

#[test]
fn test_e2e_deeply_nested_element_is_not_written() {
    let mut nested = Element::new(QName::unqualified("leaf"));
    for _ in 0..100 {
        nested = Element::new(QName::unqualified("d")).with_child(nested);
    }
    let mut msg = Message::new();
    msg.set_body([nested]);

    let err = msg.to_xml().unwrap_err();
    assert!(matches!(err, SoapError::Write(_)));
}

#[test]
fn test_e2e_unqualified_body_element_with_own_default_namespace() {
    let mut msg = Message::new();
    msg.set_body([Element::new(QName::unqualified("plain"))
        .with_namespace(zentinel_wsman_soap::Namespace::new("", "urn:d"))
        .with_child(Element::new(QName::new("urn:d", "inner")).with_text("v"))]);

    let xml = msg.to_xml().unwrap();
    let parsed = Message::parse(xml.as_bytes()).unwrap();
    let plain = parsed.body()[0];
    assert_eq!(parsed.node(plain).name(), &QName::unqualified("plain"));
    let inner = parsed.document().children(plain)[0];
    assert_eq!(parsed.node(inner).name(), &QName::new("urn:d", "inner"));
    assert_eq!(parsed.text(inner), Some("v"));
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_content_type() {
    assert_eq!(CONTENT_TYPE, "application/soap+xml; charset=utf-8");
}

#[test]
fn test_registry_covers_most_used() {
    for ns in namespaces::MOST_USED {
        assert_eq!(namespaces::lookup(ns.prefix()), Some(ns));
    }
}
