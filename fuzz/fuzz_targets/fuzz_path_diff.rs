#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use navkit_core::Difference;

#[derive(Arbitrary, Debug)]
struct Input {
    old: Vec<u8>,
    new: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let Input { mut old, mut new } = input;
    old.truncate(64);
    new.truncate(64);
    for v in old.iter_mut().chain(new.iter_mut()) {
        *v %= 8;
    }

    let diff = Difference::between(&old, &new);
    assert!(diff.removals().windows(2).all(|w| w[0] < w[1]));
    assert!(diff.insertions().windows(2).all(|w| w[0] < w[1]));

    // Removals (highest first), then insertions (lowest first), give `new`.
    let mut applied = old.clone();
    for &index in diff.removals().iter().rev() {
        applied.remove(index);
    }
    for &index in diff.insertions() {
        applied.insert(index, new[index]);
    }
    assert_eq!(applied, new);

    if old == new {
        assert!(diff.is_empty());
    }
    if let Some(start) = diff.trailing_removal_start(new.len()) {
        assert_eq!(start, new.len());
        assert_eq!(&old[..start], &new[..]);
    }
    if diff.is_single_push(new.len()) {
        assert_eq!(&new[..new.len() - 1], &old[..]);
    }
});
