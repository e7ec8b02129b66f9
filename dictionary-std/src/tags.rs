//! Data element tag declarations
//!
//! Each constant maps an attribute keyword to its tag.
//! Repeating groups are declared with the `xx` portion zeroed.
// Automatically generated. Edit at your own risk.

use dcm_core::dictionary::{DictionaryEntry as E, TagRange::*};
use dcm_core::header::{Tag, VR};

/// CommandGroupLength (0000,0000) UL 1
#[rustfmt::skip]
pub const COMMAND_GROUP_LENGTH: Tag = Tag(0x0000, 0x0000);
/// AffectedSOPClassUID (0000,0002) UI 1
#[rustfmt::skip]
pub const AFFECTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0002);
/// RequestedSOPClassUID (0000,0003) UI 1
#[rustfmt::skip]
pub const REQUESTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0003);
/// CommandField (0000,0100) US 1
#[rustfmt::skip]
pub const COMMAND_FIELD: Tag = Tag(0x0000, 0x0100);
/// MessageID (0000,0110) US 1
#[rustfmt::skip]
pub const MESSAGE_ID: Tag = Tag(0x0000, 0x0110);
/// MessageIDBeingRespondedTo (0000,0120) US 1
#[rustfmt::skip]
pub const MESSAGE_ID_BEING_RESPONDED_TO: Tag = Tag(0x0000, 0x0120);
/// MoveDestination (0000,0600) AE 1
#[rustfmt::skip]
pub const MOVE_DESTINATION: Tag = Tag(0x0000, 0x0600);
/// Priority (0000,0700) US 1
#[rustfmt::skip]
pub const PRIORITY: Tag = Tag(0x0000, 0x0700);
/// CommandDataSetType (0000,0800) US 1
#[rustfmt::skip]
pub const COMMAND_DATA_SET_TYPE: Tag = Tag(0x0000, 0x0800);
/// Status (0000,0900) US 1
#[rustfmt::skip]
pub const STATUS: Tag = Tag(0x0000, 0x0900);
/// OffendingElement (0000,0901) AT 1-n
#[rustfmt::skip]
pub const OFFENDING_ELEMENT: Tag = Tag(0x0000, 0x0901);
/// ErrorComment (0000,0902) LO 1
#[rustfmt::skip]
pub const ERROR_COMMENT: Tag = Tag(0x0000, 0x0902);
/// ErrorID (0000,0903) US 1
#[rustfmt::skip]
pub const ERROR_ID: Tag = Tag(0x0000, 0x0903);
/// AffectedSOPInstanceUID (0000,1000) UI 1
#[rustfmt::skip]
pub const AFFECTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1000);
/// RequestedSOPInstanceUID (0000,1001) UI 1
#[rustfmt::skip]
pub const REQUESTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1001);
/// NumberOfRemainingSuboperations (0000,1020) US 1
#[rustfmt::skip]
pub const NUMBER_OF_REMAINING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1020);
/// NumberOfCompletedSuboperations (0000,1021) US 1
#[rustfmt::skip]
pub const NUMBER_OF_COMPLETED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1021);
/// NumberOfFailedSuboperations (0000,1022) US 1
#[rustfmt::skip]
pub const NUMBER_OF_FAILED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1022);
/// NumberOfWarningSuboperations (0000,1023) US 1
#[rustfmt::skip]
pub const NUMBER_OF_WARNING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1023);
/// MoveOriginatorApplicationEntityTitle (0000,1030) AE 1
#[rustfmt::skip]
pub const MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0000, 0x1030);
/// MoveOriginatorMessageID (0000,1031) US 1
#[rustfmt::skip]
pub const MOVE_ORIGINATOR_MESSAGE_ID: Tag = Tag(0x0000, 0x1031);
/// FileMetaInformationGroupLength (0002,0000) UL 1
#[rustfmt::skip]
pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
/// FileMetaInformationVersion (0002,0001) OB 1
#[rustfmt::skip]
pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
/// MediaStorageSOPClassUID (0002,0002) UI 1
#[rustfmt::skip]
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
/// MediaStorageSOPInstanceUID (0002,0003) UI 1
#[rustfmt::skip]
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
/// TransferSyntaxUID (0002,0010) UI 1
#[rustfmt::skip]
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
/// ImplementationClassUID (0002,0012) UI 1
#[rustfmt::skip]
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
/// ImplementationVersionName (0002,0013) SH 1
#[rustfmt::skip]
pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);
/// SourceApplicationEntityTitle (0002,0016) AE 1
#[rustfmt::skip]
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);
/// PrivateInformationCreatorUID (0002,0100) UI 1
#[rustfmt::skip]
pub const PRIVATE_INFORMATION_CREATOR_UID: Tag = Tag(0x0002, 0x0100);
/// PrivateInformation (0002,0102) OB 1
#[rustfmt::skip]
pub const PRIVATE_INFORMATION: Tag = Tag(0x0002, 0x0102);
/// SpecificCharacterSet (0008,0005) CS 1-n
#[rustfmt::skip]
pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
/// ImageType (0008,0008) CS 2-n
#[rustfmt::skip]
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
/// RecognitionCode (0008,0010) SH 1 (retired)
#[rustfmt::skip]
pub const RECOGNITION_CODE: Tag = Tag(0x0008, 0x0010);
/// InstanceCreationDate (0008,0012) DA 1
#[rustfmt::skip]
pub const INSTANCE_CREATION_DATE: Tag = Tag(0x0008, 0x0012);
/// InstanceCreationTime (0008,0013) TM 1
#[rustfmt::skip]
pub const INSTANCE_CREATION_TIME: Tag = Tag(0x0008, 0x0013);
/// SOPClassUID (0008,0016) UI 1
#[rustfmt::skip]
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
/// SOPInstanceUID (0008,0018) UI 1
#[rustfmt::skip]
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
/// StudyDate (0008,0020) DA 1
#[rustfmt::skip]
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
/// SeriesDate (0008,0021) DA 1
#[rustfmt::skip]
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
/// AcquisitionDate (0008,0022) DA 1
#[rustfmt::skip]
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
/// ContentDate (0008,0023) DA 1
#[rustfmt::skip]
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
/// StudyTime (0008,0030) TM 1
#[rustfmt::skip]
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
/// SeriesTime (0008,0031) TM 1
#[rustfmt::skip]
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
/// AcquisitionTime (0008,0032) TM 1
#[rustfmt::skip]
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
/// ContentTime (0008,0033) TM 1
#[rustfmt::skip]
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
/// DataSetType (0008,0040) US 1 (retired)
#[rustfmt::skip]
pub const DATA_SET_TYPE: Tag = Tag(0x0008, 0x0040);
/// DataSetSubtype (0008,0041) LO 1 (retired)
#[rustfmt::skip]
pub const DATA_SET_SUBTYPE: Tag = Tag(0x0008, 0x0041);
/// AccessionNumber (0008,0050) SH 1
#[rustfmt::skip]
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
/// QueryRetrieveLevel (0008,0052) CS 1
#[rustfmt::skip]
pub const QUERY_RETRIEVE_LEVEL: Tag = Tag(0x0008, 0x0052);
/// RetrieveAETitle (0008,0054) AE 1-n
#[rustfmt::skip]
pub const RETRIEVE_AE_TITLE: Tag = Tag(0x0008, 0x0054);
/// InstanceAvailability (0008,0056) CS 1
#[rustfmt::skip]
pub const INSTANCE_AVAILABILITY: Tag = Tag(0x0008, 0x0056);
/// Modality (0008,0060) CS 1
#[rustfmt::skip]
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
/// ModalitiesInStudy (0008,0061) CS 1-n
#[rustfmt::skip]
pub const MODALITIES_IN_STUDY: Tag = Tag(0x0008, 0x0061);
/// ConversionType (0008,0064) CS 1
#[rustfmt::skip]
pub const CONVERSION_TYPE: Tag = Tag(0x0008, 0x0064);
/// Manufacturer (0008,0070) LO 1
#[rustfmt::skip]
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
/// InstitutionName (0008,0080) LO 1
#[rustfmt::skip]
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
/// ReferringPhysicianName (0008,0090) PN 1
#[rustfmt::skip]
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
/// CodeValue (0008,0100) SH 1
#[rustfmt::skip]
pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
/// CodingSchemeDesignator (0008,0102) SH 1
#[rustfmt::skip]
pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
/// CodeMeaning (0008,0104) LO 1
#[rustfmt::skip]
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
/// NetworkID (0008,1000) AE 1 (retired)
#[rustfmt::skip]
pub const NETWORK_ID: Tag = Tag(0x0008, 0x1000);
/// StationName (0008,1010) SH 1
#[rustfmt::skip]
pub const STATION_NAME: Tag = Tag(0x0008, 0x1010);
/// StudyDescription (0008,1030) LO 1
#[rustfmt::skip]
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
/// ProcedureCodeSequence (0008,1032) SQ 1
#[rustfmt::skip]
pub const PROCEDURE_CODE_SEQUENCE: Tag = Tag(0x0008, 0x1032);
/// SeriesDescription (0008,103E) LO 1
#[rustfmt::skip]
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
/// InstitutionalDepartmentName (0008,1040) LO 1
#[rustfmt::skip]
pub const INSTITUTIONAL_DEPARTMENT_NAME: Tag = Tag(0x0008, 0x1040);
/// ManufacturerModelName (0008,1090) LO 1
#[rustfmt::skip]
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
/// ReferencedStudySequence (0008,1110) SQ 1
#[rustfmt::skip]
pub const REFERENCED_STUDY_SEQUENCE: Tag = Tag(0x0008, 0x1110);
/// ReferencedPerformedProcedureStepSequence (0008,1111) SQ 1
#[rustfmt::skip]
pub const REFERENCED_PERFORMED_PROCEDURE_STEP_SEQUENCE: Tag = Tag(0x0008, 0x1111);
/// ReferencedImageSequence (0008,1140) SQ 1
#[rustfmt::skip]
pub const REFERENCED_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x1140);
/// ReferencedSOPClassUID (0008,1150) UI 1
#[rustfmt::skip]
pub const REFERENCED_SOP_CLASS_UID: Tag = Tag(0x0008, 0x1150);
/// ReferencedSOPInstanceUID (0008,1155) UI 1
#[rustfmt::skip]
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
/// DerivationDescription (0008,2111) ST 1
#[rustfmt::skip]
pub const DERIVATION_DESCRIPTION: Tag = Tag(0x0008, 0x2111);
/// PatientName (0010,0010) PN 1
#[rustfmt::skip]
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
/// PatientID (0010,0020) LO 1
#[rustfmt::skip]
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
/// IssuerOfPatientID (0010,0021) LO 1
#[rustfmt::skip]
pub const ISSUER_OF_PATIENT_ID: Tag = Tag(0x0010, 0x0021);
/// PatientBirthDate (0010,0030) DA 1
#[rustfmt::skip]
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
/// PatientBirthTime (0010,0032) TM 1
#[rustfmt::skip]
pub const PATIENT_BIRTH_TIME: Tag = Tag(0x0010, 0x0032);
/// PatientSex (0010,0040) CS 1
#[rustfmt::skip]
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
/// OtherPatientIDs (0010,1000) LO 1-n (retired)
#[rustfmt::skip]
pub const OTHER_PATIENT_I_DS: Tag = Tag(0x0010, 0x1000);
/// OtherPatientNames (0010,1001) PN 1-n
#[rustfmt::skip]
pub const OTHER_PATIENT_NAMES: Tag = Tag(0x0010, 0x1001);
/// PatientAge (0010,1010) AS 1
#[rustfmt::skip]
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);
/// PatientSize (0010,1020) DS 1
#[rustfmt::skip]
pub const PATIENT_SIZE: Tag = Tag(0x0010, 0x1020);
/// PatientWeight (0010,1030) DS 1
#[rustfmt::skip]
pub const PATIENT_WEIGHT: Tag = Tag(0x0010, 0x1030);
/// EthnicGroup (0010,2160) SH 1
#[rustfmt::skip]
pub const ETHNIC_GROUP: Tag = Tag(0x0010, 0x2160);
/// PatientComments (0010,4000) LT 1
#[rustfmt::skip]
pub const PATIENT_COMMENTS: Tag = Tag(0x0010, 0x4000);
/// BodyPartExamined (0018,0015) CS 1
#[rustfmt::skip]
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
/// SliceThickness (0018,0050) DS 1
#[rustfmt::skip]
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
/// KVP (0018,0060) DS 1
#[rustfmt::skip]
pub const KVP: Tag = Tag(0x0018, 0x0060);
/// SpacingBetweenSlices (0018,0088) DS 1
#[rustfmt::skip]
pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
/// DeviceSerialNumber (0018,1000) LO 1
#[rustfmt::skip]
pub const DEVICE_SERIAL_NUMBER: Tag = Tag(0x0018, 0x1000);
/// SoftwareVersions (0018,1020) LO 1-n
#[rustfmt::skip]
pub const SOFTWARE_VERSIONS: Tag = Tag(0x0018, 0x1020);
/// ProtocolName (0018,1030) LO 1
#[rustfmt::skip]
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);
/// ExposureTime (0018,1150) IS 1
#[rustfmt::skip]
pub const EXPOSURE_TIME: Tag = Tag(0x0018, 0x1150);
/// XRayTubeCurrent (0018,1151) IS 1
#[rustfmt::skip]
pub const X_RAY_TUBE_CURRENT: Tag = Tag(0x0018, 0x1151);
/// PatientPosition (0018,5100) CS 1
#[rustfmt::skip]
pub const PATIENT_POSITION: Tag = Tag(0x0018, 0x5100);
/// StudyInstanceUID (0020,000D) UI 1
#[rustfmt::skip]
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
/// SeriesInstanceUID (0020,000E) UI 1
#[rustfmt::skip]
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
/// StudyID (0020,0010) SH 1
#[rustfmt::skip]
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
/// SeriesNumber (0020,0011) IS 1
#[rustfmt::skip]
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
/// AcquisitionNumber (0020,0012) IS 1
#[rustfmt::skip]
pub const ACQUISITION_NUMBER: Tag = Tag(0x0020, 0x0012);
/// InstanceNumber (0020,0013) IS 1
#[rustfmt::skip]
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
/// PatientOrientation (0020,0020) CS 2
#[rustfmt::skip]
pub const PATIENT_ORIENTATION: Tag = Tag(0x0020, 0x0020);
/// ImagePosition (0020,0030) DS 3 (retired)
#[rustfmt::skip]
pub const IMAGE_POSITION: Tag = Tag(0x0020, 0x0030);
/// ImagePositionPatient (0020,0032) DS 3
#[rustfmt::skip]
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
/// ImageOrientation (0020,0035) DS 6 (retired)
#[rustfmt::skip]
pub const IMAGE_ORIENTATION: Tag = Tag(0x0020, 0x0035);
/// ImageOrientationPatient (0020,0037) DS 6
#[rustfmt::skip]
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
/// FrameOfReferenceUID (0020,0052) UI 1
#[rustfmt::skip]
pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
/// PositionReferenceIndicator (0020,1040) LO 1
#[rustfmt::skip]
pub const POSITION_REFERENCE_INDICATOR: Tag = Tag(0x0020, 0x1040);
/// SliceLocation (0020,1041) DS 1
#[rustfmt::skip]
pub const SLICE_LOCATION: Tag = Tag(0x0020, 0x1041);
/// NumberOfStudyRelatedSeries (0020,1206) IS 1
#[rustfmt::skip]
pub const NUMBER_OF_STUDY_RELATED_SERIES: Tag = Tag(0x0020, 0x1206);
/// NumberOfStudyRelatedInstances (0020,1208) IS 1
#[rustfmt::skip]
pub const NUMBER_OF_STUDY_RELATED_INSTANCES: Tag = Tag(0x0020, 0x1208);
/// NumberOfSeriesRelatedInstances (0020,1209) IS 1
#[rustfmt::skip]
pub const NUMBER_OF_SERIES_RELATED_INSTANCES: Tag = Tag(0x0020, 0x1209);
/// SamplesPerPixel (0028,0002) US 1
#[rustfmt::skip]
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// PhotometricInterpretation (0028,0004) CS 1
#[rustfmt::skip]
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// PlanarConfiguration (0028,0006) US 1
#[rustfmt::skip]
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
/// NumberOfFrames (0028,0008) IS 1
#[rustfmt::skip]
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// Rows (0028,0010) US 1
#[rustfmt::skip]
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011) US 1
#[rustfmt::skip]
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// PixelSpacing (0028,0030) DS 2
#[rustfmt::skip]
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
/// ImageFormat (0028,0040) CS 1 (retired)
#[rustfmt::skip]
pub const IMAGE_FORMAT: Tag = Tag(0x0028, 0x0040);
/// BitsAllocated (0028,0100) US 1
#[rustfmt::skip]
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// BitsStored (0028,0101) US 1
#[rustfmt::skip]
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// HighBit (0028,0102) US 1
#[rustfmt::skip]
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
/// PixelRepresentation (0028,0103) US 1
#[rustfmt::skip]
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
/// SmallestImagePixelValue (0028,0106) US or SS 1
#[rustfmt::skip]
pub const SMALLEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0106);
/// LargestImagePixelValue (0028,0107) US or SS 1
#[rustfmt::skip]
pub const LARGEST_IMAGE_PIXEL_VALUE: Tag = Tag(0x0028, 0x0107);
/// WindowCenter (0028,1050) DS 1-n
#[rustfmt::skip]
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
/// WindowWidth (0028,1051) DS 1-n
#[rustfmt::skip]
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
/// RescaleIntercept (0028,1052) DS 1
#[rustfmt::skip]
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
/// RescaleSlope (0028,1053) DS 1
#[rustfmt::skip]
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
/// LossyImageCompression (0028,2110) CS 1
#[rustfmt::skip]
pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);
/// RequestedProcedureDescription (0032,1060) LO 1
#[rustfmt::skip]
pub const REQUESTED_PROCEDURE_DESCRIPTION: Tag = Tag(0x0032, 0x1060);
/// ScheduledStationAETitle (0040,0001) AE 1-n
#[rustfmt::skip]
pub const SCHEDULED_STATION_AE_TITLE: Tag = Tag(0x0040, 0x0001);
/// ScheduledProcedureStepStartDate (0040,0002) DA 1
#[rustfmt::skip]
pub const SCHEDULED_PROCEDURE_STEP_START_DATE: Tag = Tag(0x0040, 0x0002);
/// ScheduledProcedureStepStartTime (0040,0003) TM 1
#[rustfmt::skip]
pub const SCHEDULED_PROCEDURE_STEP_START_TIME: Tag = Tag(0x0040, 0x0003);
/// ScheduledProcedureStepID (0040,0009) SH 1
#[rustfmt::skip]
pub const SCHEDULED_PROCEDURE_STEP_ID: Tag = Tag(0x0040, 0x0009);
/// ScheduledProcedureStepSequence (0040,0100) SQ 1
#[rustfmt::skip]
pub const SCHEDULED_PROCEDURE_STEP_SEQUENCE: Tag = Tag(0x0040, 0x0100);
/// RequestedProcedureID (0040,1001) SH 1
#[rustfmt::skip]
pub const REQUESTED_PROCEDURE_ID: Tag = Tag(0x0040, 0x1001);
/// ValueType (0040,A040) CS 1
#[rustfmt::skip]
pub const VALUE_TYPE: Tag = Tag(0x0040, 0xA040);
/// ConceptNameCodeSequence (0040,A043) SQ 1
#[rustfmt::skip]
pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA043);
/// TextValue (0040,A160) UT 1
#[rustfmt::skip]
pub const TEXT_VALUE: Tag = Tag(0x0040, 0xA160);
/// ContentSequence (0040,A730) SQ 1
#[rustfmt::skip]
pub const CONTENT_SEQUENCE: Tag = Tag(0x0040, 0xA730);
/// RadiopharmaceuticalInformationSequence (0054,0016) SQ 1
#[rustfmt::skip]
pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
/// IconImageSequence (0088,0200) SQ 1
#[rustfmt::skip]
pub const ICON_IMAGE_SEQUENCE: Tag = Tag(0x0088, 0x0200);
/// CurveDimensions (50xx,0005) US 1 (retired)
#[rustfmt::skip]
pub const CURVE_DIMENSIONS: Tag = Tag(0x5000, 0x0005);
/// NumberOfPoints (50xx,0010) US 1 (retired)
#[rustfmt::skip]
pub const NUMBER_OF_POINTS: Tag = Tag(0x5000, 0x0010);
/// CurveData (50xx,3000) OB or OW 1 (retired)
#[rustfmt::skip]
pub const CURVE_DATA: Tag = Tag(0x5000, 0x3000);
/// OverlayRows (60xx,0010) US 1
#[rustfmt::skip]
pub const OVERLAY_ROWS: Tag = Tag(0x6000, 0x0010);
/// OverlayColumns (60xx,0011) US 1
#[rustfmt::skip]
pub const OVERLAY_COLUMNS: Tag = Tag(0x6000, 0x0011);
/// OverlayType (60xx,0040) CS 1
#[rustfmt::skip]
pub const OVERLAY_TYPE: Tag = Tag(0x6000, 0x0040);
/// OverlayOrigin (60xx,0050) SS 2
#[rustfmt::skip]
pub const OVERLAY_ORIGIN: Tag = Tag(0x6000, 0x0050);
/// OverlayBitsAllocated (60xx,0100) US 1
#[rustfmt::skip]
pub const OVERLAY_BITS_ALLOCATED: Tag = Tag(0x6000, 0x0100);
/// OverlayBitPosition (60xx,0102) US 1
#[rustfmt::skip]
pub const OVERLAY_BIT_POSITION: Tag = Tag(0x6000, 0x0102);
/// OverlayData (60xx,3000) OB or OW 1
#[rustfmt::skip]
pub const OVERLAY_DATA: Tag = Tag(0x6000, 0x3000);
/// PixelData (7FE0,0010) OB or OW 1
#[rustfmt::skip]
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
/// DataSetTrailingPadding (FFFC,FFFC) OB 1
#[rustfmt::skip]
pub const DATA_SET_TRAILING_PADDING: Tag = Tag(0xFFFC, 0xFFFC);

#[rustfmt::skip]
pub(crate) static ENTRIES: &[E] = &[
    E::new(COMMAND_GROUP_LENGTH, "CommandGroupLength", VR::UL, "1"),
    E::new(AFFECTED_SOP_CLASS_UID, "AffectedSOPClassUID", VR::UI, "1"),
    E::new(REQUESTED_SOP_CLASS_UID, "RequestedSOPClassUID", VR::UI, "1"),
    E::new(COMMAND_FIELD, "CommandField", VR::US, "1"),
    E::new(MESSAGE_ID, "MessageID", VR::US, "1"),
    E::new(MESSAGE_ID_BEING_RESPONDED_TO, "MessageIDBeingRespondedTo", VR::US, "1"),
    E::new(MOVE_DESTINATION, "MoveDestination", VR::AE, "1"),
    E::new(PRIORITY, "Priority", VR::US, "1"),
    E::new(COMMAND_DATA_SET_TYPE, "CommandDataSetType", VR::US, "1"),
    E::new(STATUS, "Status", VR::US, "1"),
    E::new(OFFENDING_ELEMENT, "OffendingElement", VR::AT, "1-n"),
    E::new(ERROR_COMMENT, "ErrorComment", VR::LO, "1"),
    E::new(ERROR_ID, "ErrorID", VR::US, "1"),
    E::new(AFFECTED_SOP_INSTANCE_UID, "AffectedSOPInstanceUID", VR::UI, "1"),
    E::new(REQUESTED_SOP_INSTANCE_UID, "RequestedSOPInstanceUID", VR::UI, "1"),
    E::new(NUMBER_OF_REMAINING_SUBOPERATIONS, "NumberOfRemainingSuboperations", VR::US, "1"),
    E::new(NUMBER_OF_COMPLETED_SUBOPERATIONS, "NumberOfCompletedSuboperations", VR::US, "1"),
    E::new(NUMBER_OF_FAILED_SUBOPERATIONS, "NumberOfFailedSuboperations", VR::US, "1"),
    E::new(NUMBER_OF_WARNING_SUBOPERATIONS, "NumberOfWarningSuboperations", VR::US, "1"),
    E::new(MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE, "MoveOriginatorApplicationEntityTitle", VR::AE, "1"),
    E::new(MOVE_ORIGINATOR_MESSAGE_ID, "MoveOriginatorMessageID", VR::US, "1"),
    E::new(FILE_META_INFORMATION_GROUP_LENGTH, "FileMetaInformationGroupLength", VR::UL, "1"),
    E::new(FILE_META_INFORMATION_VERSION, "FileMetaInformationVersion", VR::OB, "1"),
    E::new(MEDIA_STORAGE_SOP_CLASS_UID, "MediaStorageSOPClassUID", VR::UI, "1"),
    E::new(MEDIA_STORAGE_SOP_INSTANCE_UID, "MediaStorageSOPInstanceUID", VR::UI, "1"),
    E::new(TRANSFER_SYNTAX_UID, "TransferSyntaxUID", VR::UI, "1"),
    E::new(IMPLEMENTATION_CLASS_UID, "ImplementationClassUID", VR::UI, "1"),
    E::new(IMPLEMENTATION_VERSION_NAME, "ImplementationVersionName", VR::SH, "1"),
    E::new(SOURCE_APPLICATION_ENTITY_TITLE, "SourceApplicationEntityTitle", VR::AE, "1"),
    E::new(PRIVATE_INFORMATION_CREATOR_UID, "PrivateInformationCreatorUID", VR::UI, "1"),
    E::new(PRIVATE_INFORMATION, "PrivateInformation", VR::OB, "1"),
    E::new(SPECIFIC_CHARACTER_SET, "SpecificCharacterSet", VR::CS, "1-n"),
    E::new(IMAGE_TYPE, "ImageType", VR::CS, "2-n"),
    E::new(RECOGNITION_CODE, "RecognitionCode", VR::SH, "1").retired(),
    E::new(INSTANCE_CREATION_DATE, "InstanceCreationDate", VR::DA, "1"),
    E::new(INSTANCE_CREATION_TIME, "InstanceCreationTime", VR::TM, "1"),
    E::new(SOP_CLASS_UID, "SOPClassUID", VR::UI, "1"),
    E::new(SOP_INSTANCE_UID, "SOPInstanceUID", VR::UI, "1"),
    E::new(STUDY_DATE, "StudyDate", VR::DA, "1"),
    E::new(SERIES_DATE, "SeriesDate", VR::DA, "1"),
    E::new(ACQUISITION_DATE, "AcquisitionDate", VR::DA, "1"),
    E::new(CONTENT_DATE, "ContentDate", VR::DA, "1"),
    E::new(STUDY_TIME, "StudyTime", VR::TM, "1"),
    E::new(SERIES_TIME, "SeriesTime", VR::TM, "1"),
    E::new(ACQUISITION_TIME, "AcquisitionTime", VR::TM, "1"),
    E::new(CONTENT_TIME, "ContentTime", VR::TM, "1"),
    E::new(DATA_SET_TYPE, "DataSetType", VR::US, "1").retired(),
    E::new(DATA_SET_SUBTYPE, "DataSetSubtype", VR::LO, "1").retired(),
    E::new(ACCESSION_NUMBER, "AccessionNumber", VR::SH, "1"),
    E::new(QUERY_RETRIEVE_LEVEL, "QueryRetrieveLevel", VR::CS, "1"),
    E::new(RETRIEVE_AE_TITLE, "RetrieveAETitle", VR::AE, "1-n"),
    E::new(INSTANCE_AVAILABILITY, "InstanceAvailability", VR::CS, "1"),
    E::new(MODALITY, "Modality", VR::CS, "1"),
    E::new(MODALITIES_IN_STUDY, "ModalitiesInStudy", VR::CS, "1-n"),
    E::new(CONVERSION_TYPE, "ConversionType", VR::CS, "1"),
    E::new(MANUFACTURER, "Manufacturer", VR::LO, "1"),
    E::new(INSTITUTION_NAME, "InstitutionName", VR::LO, "1"),
    E::new(REFERRING_PHYSICIAN_NAME, "ReferringPhysicianName", VR::PN, "1"),
    E::new(CODE_VALUE, "CodeValue", VR::SH, "1"),
    E::new(CODING_SCHEME_DESIGNATOR, "CodingSchemeDesignator", VR::SH, "1"),
    E::new(CODE_MEANING, "CodeMeaning", VR::LO, "1"),
    E::new(NETWORK_ID, "NetworkID", VR::AE, "1").retired(),
    E::new(STATION_NAME, "StationName", VR::SH, "1"),
    E::new(STUDY_DESCRIPTION, "StudyDescription", VR::LO, "1"),
    E::new(PROCEDURE_CODE_SEQUENCE, "ProcedureCodeSequence", VR::SQ, "1"),
    E::new(SERIES_DESCRIPTION, "SeriesDescription", VR::LO, "1"),
    E::new(INSTITUTIONAL_DEPARTMENT_NAME, "InstitutionalDepartmentName", VR::LO, "1"),
    E::new(MANUFACTURER_MODEL_NAME, "ManufacturerModelName", VR::LO, "1"),
    E::new(REFERENCED_STUDY_SEQUENCE, "ReferencedStudySequence", VR::SQ, "1"),
    E::new(REFERENCED_PERFORMED_PROCEDURE_STEP_SEQUENCE, "ReferencedPerformedProcedureStepSequence", VR::SQ, "1"),
    E::new(REFERENCED_IMAGE_SEQUENCE, "ReferencedImageSequence", VR::SQ, "1"),
    E::new(REFERENCED_SOP_CLASS_UID, "ReferencedSOPClassUID", VR::UI, "1"),
    E::new(REFERENCED_SOP_INSTANCE_UID, "ReferencedSOPInstanceUID", VR::UI, "1"),
    E::new(DERIVATION_DESCRIPTION, "DerivationDescription", VR::ST, "1"),
    E::new(PATIENT_NAME, "PatientName", VR::PN, "1"),
    E::new(PATIENT_ID, "PatientID", VR::LO, "1"),
    E::new(ISSUER_OF_PATIENT_ID, "IssuerOfPatientID", VR::LO, "1"),
    E::new(PATIENT_BIRTH_DATE, "PatientBirthDate", VR::DA, "1"),
    E::new(PATIENT_BIRTH_TIME, "PatientBirthTime", VR::TM, "1"),
    E::new(PATIENT_SEX, "PatientSex", VR::CS, "1"),
    E::new(OTHER_PATIENT_I_DS, "OtherPatientIDs", VR::LO, "1-n").retired(),
    E::new(OTHER_PATIENT_NAMES, "OtherPatientNames", VR::PN, "1-n"),
    E::new(PATIENT_AGE, "PatientAge", VR::AS, "1"),
    E::new(PATIENT_SIZE, "PatientSize", VR::DS, "1"),
    E::new(PATIENT_WEIGHT, "PatientWeight", VR::DS, "1"),
    E::new(ETHNIC_GROUP, "EthnicGroup", VR::SH, "1"),
    E::new(PATIENT_COMMENTS, "PatientComments", VR::LT, "1"),
    E::new(BODY_PART_EXAMINED, "BodyPartExamined", VR::CS, "1"),
    E::new(SLICE_THICKNESS, "SliceThickness", VR::DS, "1"),
    E::new(KVP, "KVP", VR::DS, "1"),
    E::new(SPACING_BETWEEN_SLICES, "SpacingBetweenSlices", VR::DS, "1"),
    E::new(DEVICE_SERIAL_NUMBER, "DeviceSerialNumber", VR::LO, "1"),
    E::new(SOFTWARE_VERSIONS, "SoftwareVersions", VR::LO, "1-n"),
    E::new(PROTOCOL_NAME, "ProtocolName", VR::LO, "1"),
    E::new(EXPOSURE_TIME, "ExposureTime", VR::IS, "1"),
    E::new(X_RAY_TUBE_CURRENT, "XRayTubeCurrent", VR::IS, "1"),
    E::new(PATIENT_POSITION, "PatientPosition", VR::CS, "1"),
    E::new(STUDY_INSTANCE_UID, "StudyInstanceUID", VR::UI, "1"),
    E::new(SERIES_INSTANCE_UID, "SeriesInstanceUID", VR::UI, "1"),
    E::new(STUDY_ID, "StudyID", VR::SH, "1"),
    E::new(SERIES_NUMBER, "SeriesNumber", VR::IS, "1"),
    E::new(ACQUISITION_NUMBER, "AcquisitionNumber", VR::IS, "1"),
    E::new(INSTANCE_NUMBER, "InstanceNumber", VR::IS, "1"),
    E::new(PATIENT_ORIENTATION, "PatientOrientation", VR::CS, "2"),
    E::new(IMAGE_POSITION, "ImagePosition", VR::DS, "3").retired(),
    E::new(IMAGE_POSITION_PATIENT, "ImagePositionPatient", VR::DS, "3"),
    E::new(IMAGE_ORIENTATION, "ImageOrientation", VR::DS, "6").retired(),
    E::new(IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient", VR::DS, "6"),
    E::new(FRAME_OF_REFERENCE_UID, "FrameOfReferenceUID", VR::UI, "1"),
    E::new(POSITION_REFERENCE_INDICATOR, "PositionReferenceIndicator", VR::LO, "1"),
    E::new(SLICE_LOCATION, "SliceLocation", VR::DS, "1"),
    E::new(NUMBER_OF_STUDY_RELATED_SERIES, "NumberOfStudyRelatedSeries", VR::IS, "1"),
    E::new(NUMBER_OF_STUDY_RELATED_INSTANCES, "NumberOfStudyRelatedInstances", VR::IS, "1"),
    E::new(NUMBER_OF_SERIES_RELATED_INSTANCES, "NumberOfSeriesRelatedInstances", VR::IS, "1"),
    E::new(SAMPLES_PER_PIXEL, "SamplesPerPixel", VR::US, "1"),
    E::new(PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", VR::CS, "1"),
    E::new(PLANAR_CONFIGURATION, "PlanarConfiguration", VR::US, "1"),
    E::new(NUMBER_OF_FRAMES, "NumberOfFrames", VR::IS, "1"),
    E::new(ROWS, "Rows", VR::US, "1"),
    E::new(COLUMNS, "Columns", VR::US, "1"),
    E::new(PIXEL_SPACING, "PixelSpacing", VR::DS, "2"),
    E::new(IMAGE_FORMAT, "ImageFormat", VR::CS, "1").retired(),
    E::new(BITS_ALLOCATED, "BitsAllocated", VR::US, "1"),
    E::new(BITS_STORED, "BitsStored", VR::US, "1"),
    E::new(HIGH_BIT, "HighBit", VR::US, "1"),
    E::new(PIXEL_REPRESENTATION, "PixelRepresentation", VR::US, "1"),
    E::new(SMALLEST_IMAGE_PIXEL_VALUE, "SmallestImagePixelValue", VR::US, "1").or_vr(VR::SS),
    E::new(LARGEST_IMAGE_PIXEL_VALUE, "LargestImagePixelValue", VR::US, "1").or_vr(VR::SS),
    E::new(WINDOW_CENTER, "WindowCenter", VR::DS, "1-n"),
    E::new(WINDOW_WIDTH, "WindowWidth", VR::DS, "1-n"),
    E::new(RESCALE_INTERCEPT, "RescaleIntercept", VR::DS, "1"),
    E::new(RESCALE_SLOPE, "RescaleSlope", VR::DS, "1"),
    E::new(LOSSY_IMAGE_COMPRESSION, "LossyImageCompression", VR::CS, "1"),
    E::new(REQUESTED_PROCEDURE_DESCRIPTION, "RequestedProcedureDescription", VR::LO, "1"),
    E::new(SCHEDULED_STATION_AE_TITLE, "ScheduledStationAETitle", VR::AE, "1-n"),
    E::new(SCHEDULED_PROCEDURE_STEP_START_DATE, "ScheduledProcedureStepStartDate", VR::DA, "1"),
    E::new(SCHEDULED_PROCEDURE_STEP_START_TIME, "ScheduledProcedureStepStartTime", VR::TM, "1"),
    E::new(SCHEDULED_PROCEDURE_STEP_ID, "ScheduledProcedureStepID", VR::SH, "1"),
    E::new(SCHEDULED_PROCEDURE_STEP_SEQUENCE, "ScheduledProcedureStepSequence", VR::SQ, "1"),
    E::new(REQUESTED_PROCEDURE_ID, "RequestedProcedureID", VR::SH, "1"),
    E::new(VALUE_TYPE, "ValueType", VR::CS, "1"),
    E::new(CONCEPT_NAME_CODE_SEQUENCE, "ConceptNameCodeSequence", VR::SQ, "1"),
    E::new(TEXT_VALUE, "TextValue", VR::UT, "1"),
    E::new(CONTENT_SEQUENCE, "ContentSequence", VR::SQ, "1"),
    E::new(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, "RadiopharmaceuticalInformationSequence", VR::SQ, "1"),
    E::new(ICON_IMAGE_SEQUENCE, "IconImageSequence", VR::SQ, "1"),
    E::ranged(Group100(CURVE_DIMENSIONS), "CurveDimensions", VR::US, "1").retired(),
    E::ranged(Group100(NUMBER_OF_POINTS), "NumberOfPoints", VR::US, "1").retired(),
    E::ranged(Group100(CURVE_DATA), "CurveData", VR::OB, "1").or_vr(VR::OW).retired(),
    E::ranged(Group100(OVERLAY_ROWS), "OverlayRows", VR::US, "1"),
    E::ranged(Group100(OVERLAY_COLUMNS), "OverlayColumns", VR::US, "1"),
    E::ranged(Group100(OVERLAY_TYPE), "OverlayType", VR::CS, "1"),
    E::ranged(Group100(OVERLAY_ORIGIN), "OverlayOrigin", VR::SS, "2"),
    E::ranged(Group100(OVERLAY_BITS_ALLOCATED), "OverlayBitsAllocated", VR::US, "1"),
    E::ranged(Group100(OVERLAY_BIT_POSITION), "OverlayBitPosition", VR::US, "1"),
    E::ranged(Group100(OVERLAY_DATA), "OverlayData", VR::OB, "1").or_vr(VR::OW),
    E::new(PIXEL_DATA, "PixelData", VR::OB, "1").or_vr(VR::OW),
    E::new(DATA_SET_TRAILING_PADDING, "DataSetTrailingPadding", VR::OB, "1"),
];
