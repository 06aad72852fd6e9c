use std::path::{Path, PathBuf};

use super::*;
use crate::error::ToolKind;
use crate::job::{Job, JobRequest, Source};

fn tools() -> ToolPaths {
    ToolPaths {
        fetch: PathBuf::from("/usr/bin/yt-dlp"),
        convert: PathBuf::from("/usr/bin/ffmpeg"),
    }
}

fn remote_job(source: Source, quality: &str, audio_only: bool) -> Job {
    let mut req = JobRequest::remote(source, "https://example.com/v/1", quality);
    req.output_name = Some("clip".into());
    req.audio_only = audio_only;
    Job::new(5, req, 0)
}

#[test]
fn primary_remote_video_command() {
    let job = remote_job(Source::PrimaryRemote, "Auto (Best available)", false);
    let inv = build_invocation(&job, Path::new("/out/temp/5"), &tools());
    assert_eq!(inv.tool, ToolKind::Fetch);
    assert_eq!(inv.program, PathBuf::from("/usr/bin/yt-dlp"));
    assert_eq!(
        inv.args_lossy(),
        vec![
            "https://example.com/v/1",
            "--recode-video",
            "mp4",
            "--output",
            "clip.mp4",
            "-f",
            "bestvideo+bestaudio/best",
            "--paths",
            "home:/out/temp/5",
            "--paths",
            "temp:/out/temp/5",
            "--newline",
        ]
    );
}

#[test]
fn audio_only_extracts_mp3() {
    let job = remote_job(Source::PrimaryRemote, "High Quality - 1080p", true);
    let args = build_invocation(&job, Path::new("/t"), &tools()).args_lossy();
    assert_eq!(&args[1..6], &["--extract-audio", "--audio-format", "mp3", "--output", "clip.mp3"]);
    assert!(args.contains(&"bestvideo[height<=1080]+bestaudio/best[height<=1080]".to_string()));
}

#[test]
fn alt_remote_sends_referer_and_no_format() {
    let mut req = JobRequest::remote(Source::AltRemote, "https://alt.example/e/9", "Medium Quality - 720p");
    req.referer = Some("https://alt.example/".into());
    req.output_name = Some("x".into());
    let job = Job::new(2, req, 0);
    let args = build_invocation(&job, Path::new("/t"), &tools()).args_lossy();
    assert_eq!(&args[..3], &["https://alt.example/e/9", "--add-header", "referer: https://alt.example/"]);
    assert!(!args.contains(&"-f".to_string()));
}

#[test]
fn primary_remote_never_sends_referer() {
    let mut req = JobRequest::remote(Source::PrimaryRemote, "https://example.com/v", "Auto");
    req.referer = Some("https://ref/".into());
    req.output_name = Some("x".into());
    let args = build_invocation(&Job::new(1, req, 0), Path::new("/t"), &tools()).args_lossy();
    assert!(!args.contains(&"--add-header".to_string()));
}

#[test]
fn percent_in_basename_is_escaped_for_template() {
    let mut req = JobRequest::remote(Source::PrimaryRemote, "https://example.com/v", "Auto");
    req.output_name = Some("100% real".into());
    let args = build_invocation(&Job::new(1, req, 0), Path::new("/t"), &tools()).args_lossy();
    assert!(args.contains(&"100%% real.mp4".to_string()));
}

#[test]
fn output_dir_is_not_part_of_the_template() {
    let mut req = JobRequest::remote(Source::PrimaryRemote, "https://example.com/v", "Auto");
    req.output_name = Some("clip".into());
    let args = build_invocation(&Job::new(1, req, 0), Path::new("/srv/50%off/temp/1"), &tools())
        .args_lossy();
    let out = args.iter().position(|a| a == "--output").unwrap();
    assert_eq!(args[out + 1], "clip.mp4");
    assert!(args.contains(&"home:/srv/50%off/temp/1".to_string()));
    assert!(!args.iter().any(|a| a.contains("%%off")));
}

#[test]
fn local_same_as_source_copies_streams() {
    let job = Job::new(3, JobRequest::local("/media/in.mkv", "Same as source"), 0);
    let inv = build_invocation(&job, Path::new("/t"), &tools());
    assert_eq!(inv.tool, ToolKind::Convert);
    assert_eq!(
        inv.args_lossy(),
        vec!["-i", "/media/in.mkv", "-c:v", "copy", "-c:a", "copy", "-map", "0", "-y", "/t/in.mp4"]
    );
}

#[test]
fn local_low_quality_reencodes() {
    let job = Job::new(3, JobRequest::local("/media/in.avi", "Low Quality MP4"), 0);
    let args = build_invocation(&job, Path::new("/t"), &tools()).args_lossy();
    assert_eq!(
        args,
        vec![
            "-i", "/media/in.avi", "-preset", "medium", "-crf", "28", "-c:v", "libx264", "-c:a",
            "aac", "-b:a", "128k", "-y", "/t/in.mp4",
        ]
    );
}

#[test]
fn command_is_deterministic() {
    let job = remote_job(Source::PrimaryRemote, "Video Only 480p", false);
    let a = build_invocation(&job, Path::new("/t"), &tools());
    let b = build_invocation(&job, Path::new("/t"), &tools());
    assert_eq!(a, b);
    assert!(a.args_lossy().contains(&"bestvideo[height<=480]".to_string()));
}

#[test]
fn settings_from_config_resolve_output_dir() {
    let cfg = crate::config::VidqConfig::default();
    let s = RunSettings::from_config(&cfg, Path::new("/home/u"));
    assert_eq!(s.output_dir, PathBuf::from("/home/u/downloads"));
    assert_eq!(s.tools.program(ToolKind::Convert), Path::new("ffmpeg"));
}
