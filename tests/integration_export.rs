//! Decode-to-export tests over fixture project directories.

mod common;

use assert_matches::assert_matches;
use common::*;
use ed5_common::Reel;
use ed5decode::batch::{Batch, ExportRequest};
use ed5decode::export::{
    render_edl, render_fcpxml, render_mlt, EdlDialect, EdlOptions, OutputTarget,
};
use ed5decode::reel::{MediaCatalog, MediaLookup};
use ed5decode::source::{EditSource, SourceOptions};
use ed5decode::Error;

fn open(path: &std::path::Path) -> EditSource {
    EditSource::open(path, &SourceOptions::default()).unwrap()
}

fn catalog(project: &ProjectDir) -> MediaCatalog {
    MediaCatalog::new(project.path(), SourceOptions::default(), 4)
}

#[test]
fn test_edl_end_to_end() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));
    let mut media = catalog(&project);

    let edl = render_edl(&mut source, &mut media, &EdlOptions::default()).unwrap();
    assert_eq!(
        edl,
        "TITLE: Harbour -- Harbour Story (E0001.ed5) FRAMERATE: 25\n\
         \n\
         001  BL        V     C        00:00:00:00 00:00:02:00 00:00:00:00 00:00:02:00\n\
         002  AX        B     C        00:00:10:00 00:00:13:00 00:00:02:00 00:00:05:00\n\
         * FROM CLIP NAME: Take 1.mov\n"
    );
}

#[test]
fn test_edl_clipnames() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));
    let options = EdlOptions {
        clipnames: true,
        ..Default::default()
    };

    let edl = render_edl(&mut source, &mut catalog(&project), &options).unwrap();
    assert!(edl.contains(
        "002  Take_1    B     C        00:00:10:00 00:00:13:00 00:00:02:00 00:00:05:00\n"
    ));
}

#[test]
fn test_gvg_edl_skip_black() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));
    let options = EdlOptions {
        dialect: EdlDialect::Gvg,
        skip_black: true,
        ..Default::default()
    };

    let edl = render_edl(&mut source, &mut catalog(&project), &options).unwrap();
    let lines: Vec<&str> = edl.lines().collect();
    assert_eq!(lines[1], "GVG EDL [WARNING: ONLY 6 BYTES OF COOKIES USED]");
    assert_eq!(
        lines[4],
        "0001 AX     A1V    C        00:00:10:00 00:00:13:00 00:00:02:00 00:00:05:00"
    );
    assert!(!edl.contains("BLK"));
}

#[test]
fn test_reconciled_events() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));
    assert_eq!(source.cells().len(), 6);
    assert_eq!(source.project_info().title, "Harbour");
    assert_eq!(source.frame_rate(), 25);

    let events = source.prepare().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].reel, Reel::Black);
    assert_eq!(events[1].reel, Reel::Cookie("S0010".into()));
    assert_eq!(events[1].track, "V1 A1");
}

#[test]
fn test_dissolve_in_file() {
    let project = ProjectDir::new("Harbour", "25", &["E0002"]);
    let mut video = cut(REEL_BLACK, (0.0, 4.0), (0.0, 4.0));
    video.extend(cut(REEL_DISSOLVE, (3.0, 4.0), (0.0, 1.0)));
    video.extend(cut(REEL_0010, (4.0, 6.0), (20.0, 22.0)));
    project.write_edit("E0002", "Edit 2 of Mix", &[edit_block("V1", &video)]);
    project.write_media("S0010", "/media/Take 1.mov");

    let mut source = open(&project.file("E0002.ed5"));
    let edl = render_edl(&mut source, &mut catalog(&project), &EdlOptions::default()).unwrap();
    let body: Vec<&str> = edl.lines().skip(2).collect();
    assert_eq!(
        body,
        [
            "001  BL        V     C        00:00:00:00 00:00:04:00 00:00:00:00 00:00:04:00",
            "001  AX        V     D    025 00:00:20:00 00:00:22:00 00:00:03:00 00:00:06:00",
            "* FROM CLIP NAME: Take 1.mov",
        ]
    );
}

#[test]
fn test_mlt_end_to_end() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));

    let xml = render_mlt(&mut source, &mut catalog(&project)).unwrap();
    assert!(xml.contains("<producer id=\"S0010\">"));
    // the recorded path is not on disk and there is no archive copy
    assert!(xml.contains("<property name=\"resource\">/media/Take 1.mov</property>"));
    assert!(xml.contains("<playlist id=\"V1\">"));
    assert!(xml.contains("<entry producer=\"BL\" in=\"0\" out=\"50\"/>"));
    assert!(xml.contains("<entry producer=\"S0010\" in=\"250\" out=\"325\"/>"));
}

#[test]
fn test_mlt_archive_fallback() {
    let project = harbour_project();
    let archived = project.write("V0010.mov", b"");
    let mut source = open(&project.file("E0001.ed5"));

    let xml = render_mlt(&mut source, &mut catalog(&project)).unwrap();
    let expected = format!(
        "<property name=\"resource\">{}</property>",
        archived.display()
    );
    assert!(xml.contains(&expected), "{}", xml);
}

#[test]
fn test_fcpxml_end_to_end() {
    let project = harbour_project();
    let mut source = open(&project.file("E0001.ed5"));

    let xml = render_fcpxml(&mut source, &mut catalog(&project)).unwrap();
    assert!(xml.contains("<!DOCTYPE xmeml>"));
    assert!(xml.contains("<name>Harbour</name>"));
    assert!(xml.contains("<clip id=\"S0010\">"));
    assert!(xml.contains("<pathurl>file:///media/Take%201.mov</pathurl>"));
    assert!(xml.contains("<name>Harbour Story</name>"));
    assert!(xml.contains("<start>50</start>"));
    assert!(xml.contains("<in>250</in>"));
    assert!(!xml.contains("/>"));
}

#[test]
fn test_subclip_is_followed() {
    let project = harbour_project();
    let subclip = segment(&[edit_block("V1", &cut(REEL_0010, (0.0, 1.0), (5.0, 6.0)))]);
    project.write("S0030.ed5", &subclip);

    let mut media = catalog(&project);
    assert_eq!(
        media.original_file("S0030").unwrap().as_deref(),
        Some("/media/Take 1.mov")
    );
}

#[test]
fn test_self_reference_hits_depth_guard() {
    let project = harbour_project();
    let looped = segment(&[edit_block("V1", &cut(REEL_0020, (0.0, 1.0), (0.0, 1.0)))]);
    project.write("S0020.ed5", &looped);

    let mut media = catalog(&project);
    assert_matches!(
        media.original_file("S0020"),
        Err(Error::ResolutionDepthExceeded { ref cookie, .. }) if cookie == "S0020"
    );
}

#[test]
fn test_missing_reel_becomes_unknown() {
    let project = ProjectDir::new("Harbour", "25", &["E0003"]);
    project.write_edit(
        "E0003",
        "Edit 3 of Gap",
        &[edit_block("V1", &cut(REEL_0030, (0.0, 1.0), (0.0, 1.0)))],
    );

    let mut source = open(&project.file("E0003.ed5"));
    let edl = render_edl(&mut source, &mut catalog(&project), &EdlOptions::default()).unwrap();
    assert!(edl.contains("001  UNKNOWN   V     C"));
}

#[test]
fn test_odd_cell_count_fails_export_only() {
    let project = ProjectDir::new("Harbour", "25", &["E0004"]);
    let mut video = cut(REEL_BLACK, (0.0, 1.0), (0.0, 1.0));
    video.push(record(SELECT_IN, 1.0, 1.0, REEL_BLACK));
    project.write_edit("E0004", "Edit 4 of Odd", &[edit_block("V1", &video)]);

    let mut source = open(&project.file("E0004.ed5"));
    assert_eq!(source.cells().len(), 3);
    assert_matches!(
        render_edl(&mut source, &mut catalog(&project), &EdlOptions::default()),
        Err(Error::OddCellCount(3))
    );
}

#[test]
fn test_framing_error_is_fatal() {
    let project = ProjectDir::new("Harbour", "25", &[]);
    let path = project.write("E0005.ed5", b"X\0\0\0\x00\x00\x00\x00\x00\x00\x00\x00");
    assert_matches!(
        EditSource::open(&path, &SourceOptions::default()),
        Err(Error::Format(_))
    );
}

#[test]
fn test_batch_concatenates_outputs() {
    let project = harbour_project();
    let mut video = cut(REEL_0010, (0.0, 1.0), (1.0, 2.0));
    video.extend(cut(REEL_BLACK, (1.0, 2.0), (0.0, 1.0)));
    project.write_edit("E0002", "Edit 2 of Second", &[edit_block("V1", &video)]);

    let target = OutputTarget::File(project.file("all.edl"));
    let request = ExportRequest {
        edl: Some(target.clone()),
        ..Default::default()
    };
    let mut batch = Batch::new(request, SourceOptions::default(), 4);
    let report = batch.run(&[project.file("O0001.odb"), project.file("E0002.ed5")]);
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 0);
    batch.finish().unwrap();

    let written = std::fs::read_to_string(project.file("all.edl")).unwrap();
    assert_eq!(written.matches("TITLE: Harbour").count(), 2);
    let first = written.find("Harbour Story").unwrap();
    let second = written.find("Second").unwrap();
    assert!(first < second);
}

#[test]
fn test_batch_continues_after_failure() {
    let project = harbour_project();
    let request = ExportRequest {
        edl: Some(OutputTarget::File(project.file("out.edl"))),
        ..Default::default()
    };
    let mut batch = Batch::new(request, SourceOptions::default(), 4);
    let report = batch.run(&[project.file("E9999.ed5"), project.file("E0001.ed5")]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.processed, 1);
    assert!(batch
        .outputs()
        .get(&OutputTarget::File(project.file("out.edl")))
        .unwrap()
        .contains("FROM CLIP NAME: Take 1.mov"));
}
