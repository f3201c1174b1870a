//! Saving and loading channel series through the session.

mod common;

use std::fs;
use std::time::Instant;

use common::{assert_float_eq, live_line, session};
use loopmon::graph::{ChannelId, snapshot};
use loopmon::link::RecordingSink;
use loopmon::{Event, MonitorError};

#[test]
fn saved_series_reloads_with_dense_indices() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session();
    let values = [1000.25, 999.5, 1001.0, -3.75, 0.1];
    for v in values {
        s.handle_line(&live_line(&v.to_string(), "5"));
    }
    let path = snapshot::default_path(dir.path(), ChannelId::Loop1);
    s.save_series(ChannelId::Loop1, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("#Loop 1\n0,1000.25\n"));

    let mut fresh = session();
    let n = fresh.load_series(ChannelId::Loop1, &path, false).unwrap();
    assert_eq!(n, values.len());
    let samples = fresh.channel(ChannelId::Loop1).store.samples();
    for (i, (sample, expected)) in samples.iter().zip(values).enumerate() {
        assert_eq!(sample.index as usize, i);
        assert_float_eq(sample.value, expected, 1e-12);
    }
    // the raw bounds of the loaded data become the Y range
    assert_eq!(fresh.channel(ChannelId::Loop1).y_range, (-3.75, 1001.0));
    assert_eq!(fresh.channel(ChannelId::Loop2).sample_count(), 0);
}

#[test]
fn load_regenerates_indices_and_skips_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop2.csv");
    fs::write(&path, "#Loop 2\n10,4.0\nbad row\n3,5.0\n7,x\n1,6.0,9\n99,7.0\n").unwrap();

    let mut s = session();
    assert_eq!(s.load_series(ChannelId::Loop2, &path, false).unwrap(), 3);
    let ch = s.channel(ChannelId::Loop2);
    let got: Vec<(u32, f64)> = ch.store.samples().iter().map(|p| (p.index, p.value)).collect();
    assert_eq!(got, vec![(0, 4.0), (1, 5.0), (2, 7.0)]);
}

#[test]
fn header_must_match_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop1.csv");
    fs::write(&path, "#Loop 1\n0,1.0\n").unwrap();
    let mut s = session();
    assert!(matches!(
        s.load_series(ChannelId::Loop2, &path, false),
        Err(MonitorError::InvalidSeriesFile(_))
    ));
    fs::write(&path, "0,1.0\n").unwrap();
    assert!(s.load_series(ChannelId::Loop1, &path, false).is_err());
}

#[test]
fn load_refused_while_connected_and_save_while_live() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("loop1.csv");
    let mut s = session();
    s.handle_line(&live_line("1", "2"));
    s.save_series(ChannelId::Loop1, &path).unwrap();

    assert!(matches!(
        s.load_series(ChannelId::Loop1, &path, true),
        Err(MonitorError::Connected)
    ));

    let mut sink = RecordingSink::connected();
    s.handle(Event::SetLive(true), Instant::now(), &mut sink).unwrap();
    assert!(matches!(
        s.save_series(ChannelId::Loop1, &path),
        Err(MonitorError::LiveActive)
    ));
}
