//! Content builders for the two archived record types: the training session
//! log and the assessment record. Layouts mirror the printed forms: a dark
//! header band, numbered sections, label/value rows and a confidentiality
//! footer on every page.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use time::{Date, Month, OffsetDateTime};

use super::{CertificateDoc, FontStyle, PdfError, Rgb};
use crate::db::{AssessmentWithModule, SessionWithModule, TopicState};

const DARK: Rgb = Rgb::from_u8(11, 12, 12);
const GREY: Rgb = Rgb::from_u8(80, 90, 95);
const LIGHT_BG: Rgb = Rgb::from_u8(243, 242, 241);
const WHITE: Rgb = Rgb::from_u8(255, 255, 255);
const GREEN: Rgb = Rgb::from_u8(76, 175, 80);
const RED: Rgb = Rgb::from_u8(239, 68, 68);
const AMBER: Rgb = Rgb::from_u8(255, 193, 7);

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT: f32 = 18.0;
const MARGIN_RIGHT: f32 = 18.0;
const FOOTER_RESERVE: f32 = 25.0;
const VALUE_COLUMN: f32 = MARGIN_LEFT + 60.0;

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

fn format_date_long(date: Date) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        month_name(date.month()),
        date.year()
    )
}

fn format_generated_at(at: OffsetDateTime) -> String {
    format!(
        "{:02}/{:02}/{} {:02}:{:02}",
        at.day(),
        at.month() as u8,
        at.year(),
        at.hour(),
        at.minute()
    )
}

/// Greedy word wrap for the notes blocks.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// Flowing layout over [`CertificateDoc`]: tracks the y cursor, breaks pages
/// when a block will not fit and stamps the footer on every page.
struct RecordLayout {
    doc: CertificateDoc,
    y: f32,
    footer_label: &'static str,
    generated_line: String,
}

impl RecordLayout {
    fn new(
        title: &str,
        subtitle: &str,
        footer_label: &'static str,
        generated_at: OffsetDateTime,
    ) -> Self {
        let mut doc = CertificateDoc::new();

        // Header band
        doc.fill_rect(0.0, 0.0, PAGE_WIDTH_MM, 26.0, DARK);
        doc.text(MARGIN_LEFT, 10.0, 14.0, FontStyle::Bold, WHITE, title);
        doc.text(MARGIN_LEFT, 17.0, 9.0, FontStyle::Regular, WHITE, subtitle);

        Self {
            doc,
            y: 34.0,
            footer_label,
            generated_line: format!(
                "Training Portal | Generated: {}",
                format_generated_at(generated_at)
            ),
        }
    }

    fn footer(&mut self) {
        self.doc.text_centered(
            PAGE_HEIGHT_MM - 10.0,
            7.5,
            FontStyle::Regular,
            GREY,
            &format!("CONFIDENTIAL - {}", self.footer_label),
        );
        let generated = self.generated_line.clone();
        self.doc.text_centered(
            PAGE_HEIGHT_MM - 6.0,
            7.5,
            FontStyle::Regular,
            GREY,
            &generated,
        );
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y + needed_mm > PAGE_HEIGHT_MM - FOOTER_RESERVE {
            self.footer();
            self.doc.new_page();
            self.y = 18.0;
        }
    }

    fn section_header(&mut self, number: u8, title: &str) {
        self.doc.fill_rect(
            MARGIN_LEFT,
            self.y,
            PAGE_WIDTH_MM - MARGIN_LEFT - MARGIN_RIGHT,
            8.0,
            LIGHT_BG,
        );
        self.doc.text(
            MARGIN_LEFT + 5.0,
            self.y + 6.0,
            11.0,
            FontStyle::Bold,
            DARK,
            &format!("{}. {}", number, title),
        );
        self.y += 12.0;
    }

    fn label_value(&mut self, label: &str, value: &str) {
        self.doc.text(
            MARGIN_LEFT + 5.0,
            self.y,
            10.0,
            FontStyle::Bold,
            DARK,
            label,
        );
        let shown = if value.is_empty() { "-" } else { value };
        self.doc
            .text(VALUE_COLUMN, self.y, 10.0, FontStyle::Regular, DARK, shown);
        self.y += 7.0;
    }

    fn notes_section(&mut self, number: u8, notes: &str) {
        self.ensure_space(20.0);
        self.section_header(number, "Notes");
        for line in wrap_text(notes, 90) {
            self.ensure_space(6.0);
            self.doc
                .text(MARGIN_LEFT + 5.0, self.y, 10.0, FontStyle::Regular, DARK, &line);
            self.y += 5.0;
        }
        self.y += 4.0;
    }

    fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        self.footer();
        self.doc.finish()
    }
}

fn draw_tick(doc: &mut CertificateDoc, x: f32, y: f32) {
    let cx = x + 7.0;
    let cy = y - 2.5;
    doc.line(cx - 2.0, cy + 1.0, cx, cy + 3.0, 0.8, GREEN);
    doc.line(cx, cy + 3.0, cx + 3.5, cy - 1.5, 0.8, GREEN);
}

fn draw_cross(doc: &mut CertificateDoc, x: f32, y: f32) {
    let cx = x + 7.0;
    let cy = y - 1.0;
    doc.line(cx - 2.0, cy - 2.0, cx + 2.0, cy + 2.0, 0.8, RED);
    doc.line(cx + 2.0, cy - 2.0, cx - 2.0, cy + 2.0, 0.8, RED);
}

/// Decode the base64 signature captured in the UI, tolerating a data-URL
/// prefix.
fn decode_signature(data: &str) -> Option<Vec<u8>> {
    let raw = data.rsplit_once("base64,").map_or(data, |(_, rest)| rest);
    BASE64.decode(raw.trim()).ok()
}

/// Build the training session log PDF.
pub fn session_log_pdf(
    session: &SessionWithModule,
    generated_at: OffsetDateTime,
) -> Result<Vec<u8>, PdfError> {
    let mut layout = RecordLayout::new(
        "Training Session Log",
        &session.module_name,
        "Training Session Log",
        generated_at,
    );

    layout.section_header(1, "Session Details");
    layout.label_value("Trainee", &session.trainee_name);
    layout.label_value("Module", &session.module_name);
    layout.label_value("Version", &session.module_version);
    layout.label_value("Date", &format_date_long(session.session_date));
    layout.label_value("Trainer", &session.trainer_name);
    layout.y += 4.0;

    let syllabus = &session.syllabus.0;
    let topics = &session.topics_completed.0;

    if !syllabus.is_empty() {
        layout.section_header(2, "Topics Covered");

        for (index, topic) in syllabus.iter().enumerate() {
            layout.ensure_space(8.0);
            // A topic past the end of the recorded states is an alignment
            // defect upstream; render it as not covered rather than hide it.
            let state = topics
                .get(index)
                .copied()
                .unwrap_or(TopicState::NotCovered);
            let y = layout.y;
            match state {
                TopicState::NotApplicable => {
                    layout.doc.text(
                        MARGIN_LEFT + 3.0,
                        y,
                        9.0,
                        FontStyle::Bold,
                        AMBER,
                        "N/A",
                    );
                }
                TopicState::Covered => draw_tick(&mut layout.doc, MARGIN_LEFT, y),
                TopicState::NotCovered => draw_cross(&mut layout.doc, MARGIN_LEFT, y),
            }
            let text_color = if state == TopicState::NotApplicable {
                GREY
            } else {
                DARK
            };
            layout
                .doc
                .text(MARGIN_LEFT + 18.0, y, 10.0, FontStyle::Regular, text_color, topic);
            layout.y += 8.0;
        }

        layout.y += 2.0;
        let summary = format!(
            "All topics covered: {}",
            if session.all_topics_covered { "Yes" } else { "No" }
        );
        layout
            .doc
            .text(MARGIN_LEFT + 5.0, layout.y, 10.0, FontStyle::Bold, DARK, &summary);
        layout.y += 8.0;
    }

    layout.ensure_space(20.0);
    layout.section_header(3, "Trainer Declaration");
    let declaration = if session.trainer_declaration {
        "Confirmed by trainer"
    } else {
        "Not confirmed"
    };
    layout
        .doc
        .text(MARGIN_LEFT + 5.0, layout.y, 10.0, FontStyle::Regular, DARK, declaration);
    layout.y += 8.0;

    layout.ensure_space(50.0);
    layout.section_header(4, "Trainee Signature");
    match session
        .trainee_signature_data
        .as_deref()
        .and_then(decode_signature)
    {
        Some(png) => {
            let y = layout.y;
            match layout.doc.image(png, MARGIN_LEFT + 5.0, y, 80.0, 30.0) {
                Ok(()) => layout.y += 35.0,
                Err(_) => {
                    layout.doc.text(
                        MARGIN_LEFT + 5.0,
                        y,
                        9.0,
                        FontStyle::Regular,
                        GREY,
                        "(Signature could not be embedded)",
                    );
                    layout.y += 7.0;
                }
            }
        }
        None => {
            layout.doc.text(
                MARGIN_LEFT + 5.0,
                layout.y,
                9.0,
                FontStyle::Regular,
                GREY,
                "No signature recorded.",
            );
            layout.y += 7.0;
        }
    }

    if let Some(notes) = session.notes.as_deref() {
        layout.notes_section(5, notes);
    }

    layout.finish()
}

/// Build the assessment record PDF.
pub fn assessment_record_pdf(
    assessment: &AssessmentWithModule,
    generated_at: OffsetDateTime,
) -> Result<Vec<u8>, PdfError> {
    let mut layout = RecordLayout::new(
        "Assessment Record",
        &assessment.module_name,
        "Assessment Record",
        generated_at,
    );

    layout.section_header(1, "Assessment Details");
    layout.label_value("Trainee", &assessment.trainee_name);
    layout.label_value("Module", &assessment.module_name);
    layout.label_value("Date", &format_date_long(assessment.assessment_date));
    layout.label_value("Assessor", &assessment.assessor_name);
    layout.y += 4.0;

    layout.section_header(2, "Result");
    layout.label_value(
        "Score",
        &format!("{} / {}", assessment.score_achieved, assessment.max_score),
    );
    layout.label_value("Pass mark", &assessment.pass_mark.to_string());

    let y = layout.y;
    layout
        .doc
        .text(MARGIN_LEFT + 5.0, y, 10.0, FontStyle::Bold, DARK, "Result");
    if assessment.passed {
        layout
            .doc
            .text(VALUE_COLUMN + 5.0, y, 12.0, FontStyle::Bold, GREEN, "PASS");
    } else {
        layout
            .doc
            .text(VALUE_COLUMN + 5.0, y, 12.0, FontStyle::Bold, RED, "FAIL");
    }
    layout.y += 7.0;

    if let Some(expiry) = assessment.expiry_date {
        layout.label_value("Expiry date", &format_date_long(expiry));
    }
    layout.y += 4.0;

    if let Some(notes) = assessment.notes.as_deref() {
        layout.notes_section(3, notes);
    }

    layout.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn sample_session(topics: Vec<TopicState>, syllabus: Vec<&str>) -> SessionWithModule {
        SessionWithModule {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            trainee_id: Uuid::new_v4(),
            trainee_name: "Jo Bloggs".to_string(),
            trainer_id: Uuid::new_v4(),
            trainer_name: "Sam Trainer".to_string(),
            session_date: date!(2024 - 03 - 05),
            topics_completed: Json(topics),
            all_topics_covered: true,
            trainer_declaration: true,
            trainee_signature_data: None,
            notes: Some("Covered evacuation route changes.".to_string()),
            gdrive_file_id: None,
            gdrive_pdf_link: None,
            gdrive_folder_id: None,
            module_name: "Fire Safety".to_string(),
            module_version: "2.1".to_string(),
            syllabus: Json(syllabus.into_iter().map(String::from).collect()),
        }
    }

    fn sample_assessment(passed: bool) -> AssessmentWithModule {
        AssessmentWithModule {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            trainee_id: Uuid::new_v4(),
            trainee_name: "Jo Bloggs".to_string(),
            assessor_id: Uuid::new_v4(),
            assessor_name: "Sam Trainer".to_string(),
            assessment_date: date!(2024 - 03 - 05),
            score_achieved: if passed { 18 } else { 9 },
            max_score: 20,
            pass_mark: 15,
            passed,
            expiry_date: passed.then(|| date!(2025 - 03 - 05)),
            proof_scan_path: None,
            proof_scan_filename: None,
            notes: None,
            gdrive_file_id: None,
            gdrive_pdf_link: None,
            gdrive_folder_id: None,
            module_name: "Manual Handling".to_string(),
            refresher_period_months: 12,
        }
    }

    const GENERATED: OffsetDateTime = datetime!(2024 - 03 - 05 14:30 UTC);

    #[test]
    fn session_log_is_a_pdf_with_expected_text() {
        let session = sample_session(
            vec![TopicState::Covered, TopicState::NotApplicable],
            vec!["Extinguisher types", "Evacuation"],
        );
        let bytes = session_log_pdf(&session, GENERATED).expect("pdf builds");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"Training Session Log"));
        assert!(contains(&bytes, b"Jo Bloggs"));
        assert!(contains(&bytes, b"All topics covered: Yes"));
        assert!(contains(&bytes, b"Confirmed by trainer"));
        assert!(contains(&bytes, b"No signature recorded."));
    }

    #[test]
    fn long_syllabus_flows_onto_more_pages() {
        let syllabus: Vec<String> = (1..=60).map(|i| format!("Topic number {}", i)).collect();
        let session = sample_session(
            vec![TopicState::Covered; 60],
            syllabus.iter().map(String::as_str).collect(),
        );
        let bytes = session_log_pdf(&session, GENERATED).expect("pdf builds");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"Topic number 60"));
    }

    #[test]
    fn assessment_record_shows_pass_result_and_expiry() {
        let bytes =
            assessment_record_pdf(&sample_assessment(true), GENERATED).expect("pdf builds");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"PASS"));
        assert!(contains(&bytes, b"18 / 20"));
        assert!(contains(&bytes, b"05 March 2025"));
    }

    #[test]
    fn assessment_record_shows_fail_without_expiry() {
        let bytes =
            assessment_record_pdf(&sample_assessment(false), GENERATED).expect("pdf builds");
        assert!(contains(&bytes, b"FAIL"));
        assert!(!contains(&bytes, b"Expiry date"));
    }

    #[test]
    fn signature_data_url_prefix_is_tolerated() {
        assert_eq!(
            decode_signature("data:image/png;base64,aGVsbG8="),
            Some(b"hello".to_vec())
        );
        assert_eq!(decode_signature("aGVsbG8="), Some(b"hello".to_vec()));
        assert_eq!(decode_signature("not base64!!"), None);
    }

    #[test]
    fn wrap_text_respects_width() {
        let lines = wrap_text("one two three four five six seven eight", 15);
        assert!(lines.iter().all(|l| l.len() <= 15));
        assert_eq!(lines.join(" "), "one two three four five six seven eight");
    }
}
