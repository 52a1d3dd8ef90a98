#![no_main]

use libfuzzer_sys::fuzz_target;
use navkit_core::{CodableRepresentation, NavigationPath};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(codable) = CodableRepresentation::from_json(json) else {
        return;
    };

    let path = NavigationPath::from_codable(codable.clone());
    assert_eq!(path.len(), codable.len());
    assert!(path.elements().iter().all(|id| !id.is_resolved()));

    // Undecoded elements re-encode to exactly what was read.
    let again = path.codable().expect("undecoded elements stay codable");
    assert_eq!(again, codable);
    let json = again.to_json().expect("representation serializes");
    let reparsed = CodableRepresentation::from_json(&json).expect("own output parses");
    assert_eq!(reparsed, codable);
});
