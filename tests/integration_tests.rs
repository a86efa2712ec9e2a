use infra_review::parser::parse_gps_log;
use infra_review::review::sync::{gps_seek_offset, initial_view_for_track};

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/gps_log.json");
    let track = parse_gps_log(bytes);

    // String and missing latitudes are dropped, order is kept.
    let stamps: Vec<_> = track.iter().map(|s| s.timestamp).collect();
    assert_eq!(
        stamps,
        vec![
            Some(1731837600000),
            Some(1731837601000),
            Some(1731837603000),
            Some(1731837605000),
            Some(1731837606500)
        ]
    );

    let view = initial_view_for_track(&track).expect("track has a position");
    assert_eq!(view.center.lat, 21.028511);

    let offsets: Vec<_> = track
        .iter()
        .map(|s| gps_seek_offset(&track[0], s).unwrap())
        .collect();
    assert_eq!(offsets, vec![0.0, 1.0, 3.0, 5.0, 6.5]);
}
