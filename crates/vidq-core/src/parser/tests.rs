use super::*;

#[test]
fn download_percent_speed_and_eta() {
    let ev = parse_fetch_line(
        "[download]  42.5% of 10.00MiB at 512.00KiB/s ETA 00:05",
        false,
    )
    .expect("event");
    assert_eq!(ev.phase, Phase::Downloading);
    assert_eq!(ev.percent, Some(42.5));
    assert_eq!(ev.speed.as_deref(), Some("512.00KiB/s"));
    assert_eq!(ev.eta.as_deref(), Some("00:05"));
    assert_eq!(ev.caption(), "42.5% (512.00KiB/s, ETA 00:05)");
}

#[test]
fn download_percent_without_speed() {
    let ev = parse_fetch_line("[download] 100% of 10.00MiB in 00:03", false).unwrap();
    assert_eq!(ev.percent, Some(100.0));
    assert_eq!(ev.speed, None);
    assert_eq!(ev.eta, None);
    assert_eq!(ev.caption(), "100.0% (N/A, ETA N/A)");
}

#[test]
fn unknown_speed_is_not_reported() {
    let ev = parse_fetch_line(
        "[download]   0.0% of ~ 50.00MiB at  Unknown B/s ETA Unknown",
        false,
    )
    .unwrap();
    assert_eq!(ev.percent, Some(0.0));
    assert_eq!(ev.speed, None);
    assert_eq!(ev.eta, None);
}

#[test]
fn eta_with_hours() {
    let ev = parse_fetch_line(
        "[download]   3.1% of 2.00GiB at 1.20MiB/s ETA 01:02:03",
        false,
    )
    .unwrap();
    assert_eq!(ev.eta.as_deref(), Some("01:02:03"));
}

#[test]
fn unrelated_lines_produce_nothing() {
    for line in [
        "",
        "   ",
        "[info] Available formats for abc:",
        "WARNING: unable to extract uploader",
        "[download] Destination: /tmp/x.mp4",
    ] {
        assert_eq!(parse_fetch_line(line, false), None, "line: {line:?}");
        assert_eq!(parse_fetch_line(line, true), None, "line: {line:?}");
    }
}

#[test]
fn unrelated_lines_leave_merging_flag_alone() {
    let mut p = LineParser::new(ToolKind::Fetch);
    assert!(p.feed("[Merger] Merging formats into \"x.mp4\"").is_some());
    assert!(p.is_merging());
    assert!(p.feed("some unrelated text").is_none());
    assert!(p.is_merging());

    let mut q = LineParser::new(ToolKind::Fetch);
    assert!(q.feed("").is_none());
    assert!(!q.is_merging());
}

#[test]
fn merge_phase_entered_once() {
    let mut p = LineParser::new(ToolKind::Fetch);
    let ev = p.feed("[Merger] Merging formats into \"out.mp4\"").unwrap();
    assert_eq!(ev.phase, Phase::Merging);
    assert!(ev.is_indeterminate());
    assert_eq!(ev.caption(), "Converting/Merging...");
    assert!(p.feed("[Merger] Merging formats into \"out.mp4\"").is_none());
    assert!(p.feed("[ExtractAudio] Destination: out.mp3").is_none());
    assert!(p.feed("Deleting original file out.f137.mp4").is_none());
}

#[test]
fn percent_after_merge_leaves_merging() {
    let mut p = LineParser::new(ToolKind::Fetch);
    p.feed("[VideoConvertor] Converting video from webm to mp4");
    assert!(p.is_merging());
    let ev = p.feed("[download]  10.0% of 3.00MiB at 1.00MiB/s ETA 00:02").unwrap();
    assert_eq!(ev.phase, Phase::Downloading);
    assert!(!p.is_merging());
    // A new merge keyword is a new phase entry.
    assert!(p.feed("Merging formats into x").is_some());
}

#[test]
fn percent_wins_over_keyword_on_same_line() {
    let ev = parse_fetch_line("[download]  50.0% of 1MiB at 1.00MiB/s ETA 00:01 (ffmpeg)", true)
        .unwrap();
    assert_eq!(ev.phase, Phase::Downloading);
    assert_eq!(ev.percent, Some(50.0));
}

#[test]
fn downloading_keyword_is_indeterminate_download() {
    let ev = parse_fetch_line("[youtube] abc: Downloading webpage", false).unwrap();
    assert_eq!(ev.phase, Phase::Downloading);
    assert!(ev.is_indeterminate());
    assert_eq!(ev.caption(), "Downloading...");
    assert_eq!(parse_fetch_line("[youtube] abc: Downloading webpage", true), None);
}

#[test]
fn convert_time_and_speed() {
    let line = "frame= 1200 fps=60 q=28.0 size=    2048kB time=00:01:05.50 bitrate= 256.0kbits/s speed=1.52x";
    let ev = parse_convert_line(line, false).unwrap();
    assert_eq!(ev.phase, Phase::Converting);
    assert!(ev.is_indeterminate());
    assert_eq!(ev.encoded, Some(Duration::from_millis(65_500)));
    assert_eq!(ev.speed.as_deref(), Some("1.52x"));
    assert_eq!(ev.caption(), "Converting... (00:01:05, Speed: 1.52x)");
    // Further time lines keep reporting while already in the converting phase.
    assert!(parse_convert_line(line, true).is_some());
}

#[test]
fn convert_time_without_speed() {
    let ev = parse_convert_line("size=0kB time=01:00:00.00 bitrate=N/A", false).unwrap();
    assert_eq!(ev.encoded, Some(Duration::from_secs(3600)));
    assert_eq!(ev.speed, None);
    assert_eq!(ev.caption(), "Converting... (01:00:00, Speed: N/A)");
}

#[test]
fn convert_huge_hour_field_is_ignored() {
    assert_eq!(parse_convert_line("time=99999999999999999:00:00.00 speed=1.0x", false), None);
    assert_eq!(parse_convert_line("time=999999999999999999999999:00:00.00", false), None);
    let ev = parse_convert_line("time=120:00:00.00 speed=1.0x", false).unwrap();
    assert_eq!(ev.encoded, Some(Duration::from_secs(120 * 3600)));
}

#[test]
fn convert_summary_line_only_when_not_converting() {
    let line = "video:5120kB audio:640kB subtitle:0kB other streams:0kB global headers:0kB";
    let ev = parse_convert_line(line, false).unwrap();
    assert_eq!(ev.caption(), "Converting...");
    assert_eq!(parse_convert_line(line, true), None);
}

#[test]
fn convert_ignores_banner_lines() {
    let mut p = LineParser::new(ToolKind::Convert);
    assert!(p.feed("ffmpeg version 6.0 Copyright (c) 2000-2023").is_none());
    assert!(p.feed("  Duration: 00:10:00.00, start: 0.000000").is_none());
    assert!(!p.is_merging());
    assert!(p.feed("time=00:00:01.00 speed=2.0x").is_some());
    assert!(p.is_merging());
}

#[test]
fn hms_formatting() {
    assert_eq!(format_hms(0), "00:00:00");
    assert_eq!(format_hms(3725), "01:02:05");
    assert_eq!(format_hms(360_000), "100:00:00");
}
