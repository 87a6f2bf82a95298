// Gemeinsame Fixtures fuer Merge- und CLI-Tests.
//
// Wird per `include!` eingebunden. Benötigte Imports:
//   use std::fs;
//   use std::path::{Path, PathBuf};
//   use std::time::{SystemTime, UNIX_EPOCH};

const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("wsdlmerge-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(&path, content).expect("write fixture");
    path
}

fn schema_doc(target_ns: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:tns="{target_ns}" targetNamespace="{target_ns}" elementFormDefault="qualified">
{body}
</xs:schema>"#
    )
}

/// Bestell-Service mit verschachtelten Imports und einem Include:
///
/// ```text
/// service.wsdl ─┬─ xsd/order.xsd ─┬─ xsd/common.xsd ── base/base.xsd
///               │                 └─ (include) xsd/order-items.xsd
///               └─ xsd/customer.xsd ── xsd/common.xsd
/// ```
fn write_order_service(dir: &Path) -> PathBuf {
    write_file(
        dir,
        "base/base.xsd",
        &schema_doc(
            "urn:base",
            r#"<xs:simpleType name="Id"><xs:restriction base="xs:string"/></xs:simpleType>"#,
        ),
    );
    write_file(
        dir,
        "xsd/common.xsd",
        &schema_doc(
            "urn:common",
            r#"<xs:import namespace="urn:base" schemaLocation="../base/base.xsd"/>
<xs:simpleType name="Money"><xs:restriction base="xs:decimal"/></xs:simpleType>"#,
        ),
    );
    write_file(
        dir,
        "xsd/order-items.xsd",
        &schema_doc(
            "urn:order",
            r#"<xs:complexType name="Item"><xs:sequence><xs:element name="sku" type="xs:string"/></xs:sequence></xs:complexType>"#,
        ),
    );
    write_file(
        dir,
        "xsd/order.xsd",
        &schema_doc(
            "urn:order",
            r#"<xs:import namespace="urn:common" schemaLocation="common.xsd"/>
<xs:include schemaLocation="order-items.xsd"/>
<xs:element name="Order" type="tns:Item"/>"#,
        ),
    );
    write_file(
        dir,
        "xsd/customer.xsd",
        &schema_doc(
            "urn:customer",
            r#"<xs:import namespace="urn:common" schemaLocation="common.xsd"/>
<xs:element name="Customer" type="xs:string"/>"#,
        ),
    );
    write_file(
        dir,
        "service.wsdl",
        r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
                  xmlns:xs="http://www.w3.org/2001/XMLSchema"
                  xmlns:ord="urn:order"
                  xmlns:tns="urn:orders:service"
                  targetNamespace="urn:orders:service">
  <wsdl:types>
    <xs:schema>
      <xs:import namespace="urn:order" schemaLocation="xsd/order.xsd"/>
      <xs:import namespace="urn:customer" schemaLocation="xsd/customer.xsd"/>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="PlaceOrder">
    <wsdl:part name="body" element="ord:Order"/>
  </wsdl:message>
  <wsdl:portType name="OrderPort">
    <wsdl:operation name="Place">
      <wsdl:input message="tns:PlaceOrder"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="OrderBinding" type="tns:OrderPort">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
  </wsdl:binding>
  <wsdl:service name="OrderService">
    <wsdl:port name="OrderPort" binding="tns:OrderBinding">
      <soap:address location="http://localhost/orders"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>
"#,
    )
}

/// WSDL mit einem einzelnen Import-Fragment.
fn single_import_wsdl(namespace: &str, location: &str) -> String {
    format!(
        r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <wsdl:types>
    <xs:schema><xs:import namespace="{namespace}" schemaLocation="{location}"/></xs:schema>
  </wsdl:types>
</wsdl:definitions>"#
    )
}

/// targetNamespace der `xs:schema` Kinder von `wsdl:types`.
fn embedded_namespaces(xml: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).expect("merged output must parse");
    let types = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((WSDL_NS, "types")))
        .expect("wsdl:types");
    types
        .children()
        .filter(|n| n.has_tag_name((XSD_NS, "schema")))
        .map(|n| n.attribute("targetNamespace").unwrap_or("").to_string())
        .collect()
}

fn count_xsd_elements(xml: &str, local_name: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).expect("merged output must parse");
    doc.descendants()
        .filter(|n| n.has_tag_name((XSD_NS, local_name)))
        .count()
}
