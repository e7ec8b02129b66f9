use dcm_core::{Length, Tag, Value, VR};
use dcm_dictionary_std::{tags, uids};
use dcm_object::{
    open_file, DefaultDicomObject, DicomObject, DuplicatePolicy, Element, Item, OpenFileOptions,
    Parent, ReadPreamble, Sequence,
};
use dcm_transfer_syntax_registry::entries::{
    EXPLICIT_VR_BIG_ENDIAN, EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN,
};
use rstest::rstest;

fn sample_object(ts: &str) -> DefaultDicomObject {
    let mut obj = DicomObject::new();
    obj.set_transfer_syntax(ts);
    obj.set_value(tags::SOP_CLASS_UID, uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
        .unwrap();
    obj.set_value(tags::SOP_INSTANCE_UID, "1.2.826.0.1.3680043.2.1125.1")
        .unwrap();
    obj.set_value(tags::PATIENT_NAME, "Doe^John").unwrap();
    obj.set_value(tags::PATIENT_ID, "OddName").unwrap();
    obj.set_value(tags::ROWS, 2_u16).unwrap();
    obj.set_value(tags::COLUMNS, 2_u16).unwrap();
    let seq = obj
        .add(Parent::Root, Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE))
        .unwrap();
    for uid in ["1.2.3", "1.2.4"] {
        let item = obj.add_item(seq, None, None).unwrap();
        obj.set_value_in(item, tags::REFERENCED_SOP_INSTANCE_UID, uid)
            .unwrap();
    }
    obj.add(
        Parent::Root,
        Element::from_bin(tags::PIXEL_DATA, VR::OW, vec![1, 0, 2, 0, 3, 0, 4, 0]),
    )
    .unwrap();
    obj
}

#[rstest]
#[case(IMPLICIT_VR_LITTLE_ENDIAN.uid())]
#[case(EXPLICIT_VR_LITTLE_ENDIAN.uid())]
#[case(EXPLICIT_VR_BIG_ENDIAN.uid())]
fn write_then_read_file(#[case] ts: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.dcm");

    let mut obj = sample_object(ts);
    obj.write_to_file(&path).unwrap();
    assert!(obj.write_success());

    let read = open_file(&path).unwrap();
    assert!(read.read_success(), "{:?}", read.messages());
    assert!(read.messages().is_empty());
    assert_eq!(read.transfer_syntax(), ts);
    assert_eq!(read.source(), Some(path.as_path()));
    assert_eq!(read.value(tags::PATIENT_NAME).unwrap(), Value::from("Doe^John"));
    assert_eq!(read.element(tags::PATIENT_ID).unwrap().len(), 8);
    assert_eq!(read.value(tags::ROWS).unwrap().to_int::<u16>().unwrap(), 2);
    assert_eq!(read.element(tags::PIXEL_DATA).unwrap().bin(), &[1, 0, 2, 0, 3, 0, 4, 0]);

    let seq = read.get(Parent::Root, tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    assert_eq!(read.count(seq), 2);
    let second = read.get(seq, 1_usize).unwrap();
    assert_eq!(
        read.value_in(second, tags::REFERENCED_SOP_INSTANCE_UID).unwrap(),
        Value::from("1.2.4")
    );

    // reading and writing again produces the same bytes
    let ts = dcm_transfer_syntax_registry::get(ts).unwrap();
    assert_eq!(
        read.encode_dataset(ts).unwrap(),
        obj.encode_dataset(ts).unwrap()
    );
    let meta = read.meta().unwrap();
    assert_eq!(meta.media_storage_sop_instance_uid, "1.2.826.0.1.3680043.2.1125.1");
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn undefined_length_sequence_items(#[case] n: usize) {
    let mut obj = DefaultDicomObject::new();
    let seq = obj
        .add(Parent::Root, Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE))
        .unwrap();
    for i in 0..n {
        let item = obj.add_item(seq, None, None).unwrap();
        obj.set_value_in(item, tags::REFERENCED_SOP_INSTANCE_UID, format!("1.2.{}", i))
            .unwrap();
    }
    obj.set_value(tags::PATIENT_ID, "after").unwrap();
    let bytes = obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap();

    let read = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Never)
        .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
        .from_bytes(&bytes);
    assert!(read.read_success(), "{:?}", read.messages());
    let seq = read.get(Parent::Root, tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    assert_eq!(read.count(seq), n);
    assert!(read.node(seq).unwrap().as_sequence().unwrap().len().is_undefined());
    for (i, item) in read.children(seq).enumerate() {
        assert_eq!(read.index_of(item), Some(i));
        assert_eq!(read.count(item), 1);
    }
    assert_eq!(read.value(tags::PATIENT_ID).unwrap(), Value::from("after"));
}

#[test]
fn defined_length_items_in_explicit_vr() {
    let mut obj = DefaultDicomObject::new();
    let seq = obj
        .add(
            Parent::Root,
            Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE).with_length(Length(0)),
        )
        .unwrap();
    let item = obj
        .add_item(seq, Some(Item::new().with_length(Length(0))), None)
        .unwrap();
    obj.set_value_in(item, tags::REFERENCED_SOP_INSTANCE_UID, "1.2.3")
        .unwrap();
    let nested = obj
        .add(item, Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE))
        .unwrap();
    obj.add_item(nested, None, None).unwrap();
    obj.set_value(tags::PATIENT_ID, "after").unwrap();

    let bytes = obj.encode_dataset(&EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
    let read = OpenFileOptions::new()
        .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
        .from_bytes(&bytes);
    assert!(read.read_success(), "{:?}", read.messages());
    assert_eq!(read.count_all(Parent::Root), 6);
    assert_eq!(read.encode_dataset(&EXPLICIT_VR_LITTLE_ENDIAN).unwrap(), bytes);
}

#[rstest]
#[case(DuplicatePolicy::KeepFirst, "1.2.3")]
#[case(DuplicatePolicy::Overwrite, "9.9")]
fn duplicates_within_an_item(#[case] policy: DuplicatePolicy, #[case] expected: &str) {
    #[rustfmt::skip]
    let bytes: &[u8] = &[
        // (0008,1140) SQ, undefined length
        0x08, 0x00, 0x40, 0x11, 0xFF, 0xFF, 0xFF, 0xFF,
        // item, undefined length
        0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
        0x08, 0x00, 0x55, 0x11, 0x06, 0x00, 0x00, 0x00, b'1', b'.', b'2', b'.', b'3', 0x00,
        0x08, 0x00, 0x55, 0x11, 0x04, 0x00, 0x00, 0x00, b'9', b'.', b'9', 0x00,
        0x08, 0x00, 0x60, 0x00, 0x02, 0x00, 0x00, 0x00, b'C', b'T',
        // item delimiter
        0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // sequence delimiter
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // (0010,0020) LO
        0x10, 0x00, 0x20, 0x00, 0x02, 0x00, 0x00, 0x00, b'I', b'D',
    ];
    let obj = OpenFileOptions::new()
        .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
        .duplicates(policy)
        .from_bytes(bytes);
    assert!(obj.read_success(), "{:?}", obj.messages());

    let seq = obj.get(Parent::Root, tags::REFERENCED_IMAGE_SEQUENCE).unwrap();
    let item = obj.get(seq, 0_usize).unwrap();
    assert_eq!(obj.count(seq), 1);
    assert_eq!(obj.count(item), 2);
    assert_eq!(
        obj.value_in(item, tags::REFERENCED_SOP_INSTANCE_UID).unwrap(),
        Value::from(expected)
    );
    // the element after the duplicate stays in the item
    assert!(obj.exists(item, tags::MODALITY));
    assert!(!obj.exists(Parent::Root, tags::MODALITY));
    assert_eq!(obj.value(tags::PATIENT_ID).unwrap(), Value::from("ID"));
}

#[test]
fn trailing_padding_after_fragments() {
    #[rustfmt::skip]
    let bytes: &[u8] = &[
        // (7FE0,0010) OB, undefined length
        0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        // empty offset table
        0xFE, 0xFF, 0x00, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // one fragment
        0xFE, 0xFF, 0x00, 0xE0, 0x04, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xBE, 0xEF,
        // (FFFC,FFFC) OB, no sequence delimiter before it
        0xFC, 0xFF, 0xFC, 0xFF, b'O', b'B', 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let obj = OpenFileOptions::new()
        .transfer_syntax("1.2.840.10008.1.2.4.50")
        .from_bytes(bytes);
    assert!(obj.read_success(), "{:?}", obj.messages());
    assert_eq!(obj.fragments(), Some(vec![vec![0xDE, 0xAD, 0xBE, 0xEF]]));
    assert!(obj.exists(Parent::Root, Tag::TRAILING_PADDING));
    let seq = obj.get(Parent::Root, Tag::PIXEL_DATA).unwrap();
    assert_eq!(obj.count(seq), 2);
}

#[test]
fn big_endian_meta_switch() {
    let mut obj = sample_object(EXPLICIT_VR_BIG_ENDIAN.uid());
    let mut bytes = Vec::new();
    obj.write_all(&mut bytes).unwrap();

    // the meta group stays in little endian
    assert_eq!(&bytes[128..132], b"DICM");
    assert_eq!(&bytes[132..138], &[0x02, 0x00, 0x00, 0x00, b'U', b'L']);

    let read = OpenFileOptions::new().from_bytes(&bytes);
    assert!(read.read_success(), "{:?}", read.messages());
    assert_eq!(read.value(tags::COLUMNS).unwrap().to_int::<u16>().unwrap(), 2);
}

#[test]
fn relative_paths_follow_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.dcm");
    sample_object(EXPLICIT_VR_LITTLE_ENDIAN.uid())
        .write_to_file(&path)
        .unwrap();

    let mut obj = open_file(&path).unwrap();
    obj.set_value(tags::PATIENT_NAME, "Roe^Jane").unwrap();
    obj.write_to_file("out.dcm").unwrap();

    let copy = open_file(dir.path().join("out.dcm")).unwrap();
    assert!(copy.read_success());
    assert_eq!(copy.value(tags::PATIENT_NAME).unwrap(), Value::from("Roe^Jane"));
}

#[test]
fn missing_magic_with_preamble_required() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.dcm");
    let obj = sample_object(IMPLICIT_VR_LITTLE_ENDIAN.uid());
    std::fs::write(&path, obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap()).unwrap();

    let read = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Always)
        .open_file(&path)
        .unwrap();
    assert!(!read.read_success());
    assert_eq!(read.count(Parent::Root), 0);

    // auto detection reads it as a raw data set
    let read = open_file(&path).unwrap();
    assert!(read.read_success());
    assert_eq!(read.transfer_syntax(), IMPLICIT_VR_LITTLE_ENDIAN.uid());
    assert_eq!(read.value(tags::PATIENT_NAME).unwrap(), Value::from("Doe^John"));
}
