use khc::core::encoder::Encoder;
use khc::core::window::{ExpandingWindow, StrictWindow};

#[test]
fn strict_window_reverse_complement_sequences_share_code_multiset() {
    let fwd = b"ACGATTAGCGATAGGGT";
    let rc = b"ACCCTATCGCTAATCGT";
    let k = 7;

    let mut fwd_codes = Vec::new();
    let mut w = StrictWindow::new(k, false, fwd).unwrap();
    while w.next() {
        fwd_codes.push(w.code().unwrap());
    }

    let mut rc_codes = Vec::new();
    let mut w2 = StrictWindow::new(k, false, rc).unwrap();
    while w2.next() {
        rc_codes.push(w2.code().unwrap());
    }
    rc_codes.reverse();

    assert_eq!(fwd_codes, rc_codes);
}

#[test]
fn k_one_canonicalizes_each_base() {
    let seq = b"ACGT";
    let mut w = StrictWindow::new(1, false, seq).unwrap();
    let mut codes = Vec::new();
    while w.next() {
        codes.push(w.code().unwrap());
    }
    let enc = Encoder::new(1).unwrap();
    assert_eq!(codes, vec![enc.encode(&[0]), enc.encode(&[1]), enc.encode(&[2]), enc.encode(&[3])]);
    // A/T share a code, as do C/G.
    assert_eq!(codes[0], codes[3]);
    assert_eq!(codes[1], codes[2]);
}

#[test]
fn sequence_shorter_than_k_yields_no_windows() {
    let mut w = StrictWindow::new(5, false, b"ACG").unwrap();
    assert!(!w.next());
}

#[test]
fn expanding_window_degenerate_subject_variant_count() {
    // k=3, window product candidates from a fully-degenerate 5-mer: "NNNNN"
    // yields 3 overlapping windows of N*N*N = 64 each.
    let mut w = ExpandingWindow::new(3, 0, b"NNNNN").unwrap();
    let mut per_window = [0u32; 3];
    let mut window_idx = -1i32;
    while w.next().unwrap() {
        if w.variant() == 0 {
            window_idx += 1;
        }
        per_window[window_idx as usize] += 1;
    }
    assert_eq!(per_window, [64, 64, 64]);
}
