#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data)
        && let Ok(mut doc) = wsdlmerge::Document::parse(text)
        && wsdlmerge::wsdl::verify_wsdl(&doc).is_ok()
    {
        let types = wsdlmerge::wsdl::find_or_create_types(&mut doc).expect("definitions root exists");
        assert!(doc.is_element(types, wsdlmerge::WSDL_NS, "types"));
    }
});
