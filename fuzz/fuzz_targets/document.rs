#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data)
        && let Ok(doc) = wsdlmerge::Document::parse(text)
    {
        let xml = wsdlmerge::to_xml_string(&doc).expect("serialize into String");
        wsdlmerge::Document::parse(&xml).expect("serialized output must parse again");
    }
});
