use encoding_rs::SHIFT_JIS;
use pretty_assertions::assert_eq;
use shiplabel_model::{
    convert, read_labels, ConversionOutcome, ConvertError, ConvertOptions, LabelLayout,
    LabelRecord, LoadError, MissingNamePolicy, SkuAllowList, TextEncoding,
};

const HEADER: &str = "注文番号,送付先郵便番号1,送付先郵便番号2,送付先住所都道府県,送付先住所郡市区,\
送付先住所それ以降の住所,送付先電話番号1,送付先電話番号2,送付先電話番号3,送付先姓,送付先名,SKU管理番号";

fn csv(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

fn utf8_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

fn shift_jis(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    assert!(!had_errors, "fixture is not representable in Shift_JIS");
    bytes.into_owned()
}

fn converted(bytes: &[u8], options: &ConvertOptions) -> Vec<LabelRecord> {
    let report = convert(bytes, options).expect("convert");
    match report.outcome {
        ConversionOutcome::Converted { labels, .. } => labels,
        ConversionOutcome::NoMatches => panic!("expected matches"),
    }
}

#[test]
fn end_to_end_row_matches_the_reference_label() {
    let input = csv(&["1001,100,1.0,東京都,千代田区,1-1-1,90,1234,5678,田中,花子,z-01"]);
    let report = convert(&shift_jis(&input), &ConvertOptions::default()).expect("convert");

    assert_eq!(report.encoding, TextEncoding::ShiftJis);
    assert_eq!(report.rows_read, 1);
    assert_eq!(
        report.labels(),
        &[LabelRecord::new(
            "〒100-0001",
            "東京都千代田区",
            "1-1-1",
            "090-1234-5678",
            "田中 花子 様",
        )]
    );

    let artifact = report.artifact().expect("artifact");
    assert_eq!(artifact.file_name, "converted_shipping_list.csv");
    assert_eq!(artifact.content_type, "text/csv");
}

#[test]
fn utf8_without_bom_falls_through_to_utf8() {
    let input = csv(&["1001,100,1.0,東京都,千代田区,1-1-1,90,1234,5678,田中,花子,z-01"]);
    let report = convert(input.as_bytes(), &ConvertOptions::default()).expect("convert");

    assert_eq!(report.encoding, TextEncoding::Utf8);
    assert_eq!(
        report.labels(),
        &[LabelRecord::new(
            "〒100-0001",
            "東京都千代田区",
            "1-1-1",
            "090-1234-5678",
            "田中 花子 様",
        )]
    );
}

#[test]
fn only_allow_listed_rows_survive_in_input_order() {
    let input = csv(&[
        "1,150,0002,東京都,渋谷区,2-2-2,3,1111,2222,佐藤,一郎, mod2 ",
        "2,150,0002,東京都,渋谷区,2-2-2,3,1111,2222,鈴木,次郎,mod5",
        "3,530,0001,大阪府,大阪市北区,3-3,6,3333,4444,高橋,三郎,bkye-c002",
        "4,530,0001,大阪府,大阪市北区,3-3,6,3333,4444,伊藤,四郎,",
    ]);
    let report = convert(&utf8_with_bom(&input), &ConvertOptions::default()).expect("convert");

    assert_eq!(report.encoding, TextEncoding::Utf8);
    assert_eq!(report.rows_read, 4);
    assert_eq!(report.matched(), 2);
    let names: Vec<&str> = report.labels().iter().map(|l| l.recipient.as_str()).collect();
    assert_eq!(names, ["佐藤 一郎 様", "高橋 三郎 様"]);
}

#[test]
fn no_matches_is_an_outcome_not_an_error() {
    let input = csv(&["1,150,0002,東京都,渋谷区,2-2-2,3,1111,2222,佐藤,一郎,mod5"]);
    let report = convert(&utf8_with_bom(&input), &ConvertOptions::default()).expect("convert");
    assert_eq!(report.outcome, ConversionOutcome::NoMatches);
    assert_eq!(report.rows_read, 1);
    assert!(report.artifact().is_none());
}

#[test]
fn missing_values_degrade_to_empty_fields() {
    let input = csv(&[
        "1,nan,nan,北海道,nan,nan,nan,nan,nan,nan,nan,lb-4",
        "2,,,,,,,,,山本,,kr-03",
        "3,060",
    ]);
    let mut options = ConvertOptions::default();
    options.allowed_skus = SkuAllowList::new(["lb-4", "kr-03"]);
    let labels = converted(&utf8_with_bom(&input), &options);

    assert_eq!(
        labels,
        vec![
            LabelRecord::new("", "北海道", "", "", "様"),
            LabelRecord::new("", "", "", "", "山本 様"),
        ]
    );
}

#[test]
fn review_policy_flags_incomplete_names() {
    let input = csv(&["1,100,0001,東京都,千代田区,1-1-1,90,1234,5678,田中,,z-01"]);
    let mut options = ConvertOptions::default();
    options.missing_name = MissingNamePolicy::FlagForReview;
    let labels = converted(&utf8_with_bom(&input), &options);
    assert_eq!(labels[0].recipient, "データ確認が必要");
}

#[test]
fn cp932_only_characters_fall_through_to_cp932() {
    // "髙" (0xFB 0xFC) only exists in the IBM extensions.
    let input = csv(&["1,100,0001,東京都,千代田区,1-1-1,90,1234,5678,髙橋,花子,z-01"]);
    let report = convert(&shift_jis(&input), &ConvertOptions::default()).expect("convert");
    assert_eq!(report.encoding, TextEncoding::Cp932);
    assert_eq!(report.labels()[0].recipient, "髙橋 花子 様");
}

#[test]
fn undecodable_input_lists_every_attempt() {
    let mut bytes = shift_jis(&csv(&[]));
    bytes.extend_from_slice(&[0x82, 0xFF, b'\n']);
    let err = convert(&bytes, &ConvertOptions::default()).unwrap_err();

    let ConvertError::Load(LoadError::Undecodable { attempts }) = &err else {
        panic!("expected undecodable, got {err:?}");
    };
    let tried: Vec<TextEncoding> = attempts.iter().map(|a| a.encoding).collect();
    assert_eq!(
        tried,
        [
            TextEncoding::ShiftJis,
            TextEncoding::Utf8,
            TextEncoding::Cp932
        ]
    );
}

#[test]
fn missing_sku_column_and_empty_input_are_load_errors() {
    let err = convert(
        &utf8_with_bom("送付先姓,送付先名\n田中,花子\n"),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Load(LoadError::MissingColumn { ref column }) if column == "SKU管理番号"
    ));

    let err = convert(b"", &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Load(LoadError::EmptyInput)));

    let err = convert(b"\n\n", &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Load(LoadError::EmptyInput)));

    // An empty sheet saved as "CSV UTF-8" is just the byte-order mark.
    let err = convert(&utf8_with_bom(""), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Load(LoadError::EmptyInput)));
}

#[test]
fn basic_layout_round_trips_with_the_legacy_file_name() {
    let input = csv(&["1,012,0034,秋田県,湯沢市,1-2,183,22,3333,小野,小町,mod3"]);
    let mut options = ConvertOptions::default();
    options.layout = LabelLayout::Basic;
    let report = convert(&shift_jis(&input), &options).expect("convert");

    let artifact = report.artifact().expect("artifact");
    assert_eq!(artifact.file_name, "converted_list.csv");

    let (layout, labels) = read_labels(&artifact.bytes).expect("read back");
    assert_eq!(layout, LabelLayout::Basic);
    assert_eq!(
        labels,
        vec![LabelRecord::new("〒012-0034", "秋田県湯沢市", "1-2", "", "小野 小町 様")]
    );
}
