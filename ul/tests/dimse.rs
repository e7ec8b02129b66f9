use dcm_dictionary_std::{tags, uids};
use dcm_core::VR;
use dcm_object::{DefaultDicomObject, Element, Parent};
use dcm_ul::{
    association::{self, AcceptAny},
    dimse::{self, status, Command, CommandField},
    provider::{FindHandler, InMemoryStore, MoveHandler},
    AssociationState, ClientAssociation, ClientAssociationOptions, ServerAssociationOptions,
    ServiceProvider,
};
use matches::assert_matches;
use std::{
    net::{SocketAddr, TcpListener},
    ops::ControlFlow,
    sync::{Arc, Mutex},
    time::Duration,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync + 'static>>;

static SCU_AE_TITLE: &str = "DIMSE-SCU";
static SCP_AE_TITLE: &str = "DIMSE-SCP";
static DESTINATION_AE_TITLE: &str = "DESTINATION";

fn instance(n: u32, patient_id: &str) -> DefaultDicomObject {
    let mut obj = DefaultDicomObject::new();
    obj.set_value(tags::SOP_CLASS_UID, uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
        .unwrap();
    obj.set_value(tags::SOP_INSTANCE_UID, format!("1.2.826.0.1.3680043.2.1125.{}", n))
        .unwrap();
    obj.set_value(tags::PATIENT_ID, patient_id).unwrap();
    obj.set_value(tags::PATIENT_NAME, format!("Patient^{}", patient_id))
        .unwrap();
    obj.set_value(tags::STUDY_INSTANCE_UID, format!("1.2.826.0.1.3680043.2.1126.{}", n))
        .unwrap();
    obj
}

fn patient_query(patient_id: &str) -> DefaultDicomObject {
    let mut obj = DefaultDicomObject::new();
    obj.set_value(tags::QUERY_RETRIEVE_LEVEL, "PATIENT").unwrap();
    obj.set_value(tags::PATIENT_ID, patient_id).unwrap();
    obj.set_value(tags::PATIENT_NAME, "").unwrap();
    obj
}

fn text(obj: &DefaultDicomObject, tag: dcm_core::Tag) -> String {
    obj.value(tag)
        .unwrap()
        .to_str()
        .trim_end_matches(|c: char| c == '\0' || c == ' ')
        .to_string()
}

fn scp_options() -> ServerAssociationOptions<'static, AcceptAny> {
    ServerAssociationOptions::new()
        .ae_title(SCP_AE_TITLE)
        .with_abstract_syntax(uids::VERIFICATION)
        .with_abstract_syntax(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
        .with_abstract_syntax(uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND)
        .with_abstract_syntax(uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE)
}

fn spawn_provider(provider: ServiceProvider) -> Result<SocketAddr> {
    let listener = TcpListener::bind("localhost:0")?;
    let addr = listener.local_addr()?;
    std::thread::spawn(move || provider.run(listener));
    Ok(addr)
}

fn connect(addr: SocketAddr) -> Result<ClientAssociation> {
    let association = ClientAssociationOptions::new()
        .calling_ae_title(SCU_AE_TITLE)
        .called_ae_title(SCP_AE_TITLE)
        .with_abstract_syntax(uids::VERIFICATION)
        .with_abstract_syntax(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
        .with_abstract_syntax(uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND)
        .with_abstract_syntax(uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE)
        .read_timeout(Duration::from_secs(10))
        .establish(addr)?;
    Ok(association)
}

#[test]
fn echo() -> Result<()> {
    let addr = spawn_provider(ServiceProvider::new(scp_options()))?;
    let mut association = connect(addr)?;
    let outcome = association.c_echo()?;
    assert!(outcome.success);
    assert_eq!(outcome.status, status::SUCCESS);
    assert_eq!(association.state(), AssociationState::Established);
    association.release()?;
    Ok(())
}

#[test]
fn echo_times_out_and_aborts() -> Result<()> {
    let listener = TcpListener::bind("localhost:0")?;
    let addr = listener.local_addr()?;
    let handle = std::thread::spawn(move || -> Result<()> {
        let (stream, _addr) = listener.accept()?;
        let association = scp_options().establish(stream)?;
        // never answer
        std::thread::sleep(Duration::from_secs(2));
        drop(association);
        Ok(())
    });

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title(SCU_AE_TITLE)
        .with_abstract_syntax(uids::VERIFICATION)
        .read_timeout(Duration::from_millis(200))
        .establish(addr)?;

    let outcome = association.c_echo();
    assert_matches!(
        outcome,
        Err(dimse::Error::Association {
            source: association::Error::Timeout { .. }
        })
    );
    assert_eq!(association.state(), AssociationState::Aborted);
    drop(association);
    handle.join().expect("SCP panicked")?;
    Ok(())
}

#[test]
fn store_objects() -> Result<()> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let provider = ServiceProvider::new(scp_options()).with_store_handler(
        move |calling_ae_title: &str, obj: DefaultDicomObject| {
            assert_eq!(calling_ae_title, SCU_AE_TITLE);
            sink.lock().unwrap().push(obj);
            status::SUCCESS
        },
    );
    let addr = spawn_provider(provider)?;

    let mut association = connect(addr)?;
    for n in 0..3 {
        let outcome = association.c_store(&instance(n, "STORE-1"))?;
        assert!(outcome.success, "{}", outcome);
    }
    association.release()?;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 3);
    assert_eq!(
        text(&received[2], tags::SOP_INSTANCE_UID),
        "1.2.826.0.1.3680043.2.1125.2"
    );
    assert_eq!(text(&received[0], tags::PATIENT_NAME), "Patient^STORE-1");
    Ok(())
}

#[test]
fn store_object_in_many_fragments() -> Result<()> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let provider = ServiceProvider::new(scp_options().max_pdu_length(4096)).with_store_handler(
        move |_: &str, obj: DefaultDicomObject| {
            sink.lock().unwrap().push(obj);
            status::SUCCESS
        },
    );
    let addr = spawn_provider(provider)?;

    let pixels: Vec<u8> = (0..40_000_u32).map(|i| (i % 251) as u8).collect();
    let mut obj = instance(5, "BIG");
    obj.add(
        Parent::Root,
        Element::new(tags::PIXEL_DATA, VR::OW, pixels.clone())?,
    )?;

    let mut association = connect(addr)?;
    assert_eq!(association.acceptor_max_pdu_length(), 4096);
    let outcome = association.c_store(&obj)?;
    assert!(outcome.success, "{}", outcome);
    association.release()?;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let pixel_data = received[0].element(tags::PIXEL_DATA)?;
    assert_eq!(pixel_data.len(), 40_000);
    assert_eq!(pixel_data.bin(), &pixels[..]);
    Ok(())
}

#[test]
fn unsupported_command_is_answered() -> Result<()> {
    let addr = spawn_provider(ServiceProvider::new(scp_options()))?;
    let mut association = connect(addr)?;
    let pc_id = association
        .accepted_presentation_contexts()
        .find(|pc| pc.abstract_syntax == uids::VERIFICATION)
        .map(|pc| pc.id)
        .expect("verification context");

    // C-GET-RQ
    let command = Command::request(CommandField::C_ECHO_RQ, uids::VERIFICATION, 21)?
        .with(tags::COMMAND_FIELD, 0x0010_u16)?;
    association.send_message(pc_id, &command, None)?;
    let response = association.receive_message()?;
    assert_eq!(response.command.get_u16(tags::COMMAND_FIELD), Some(0x8010));
    assert_eq!(response.command.message_id_being_responded_to(), Some(21));
    assert_eq!(response.command.status(), Some(status::UNRECOGNIZED_OPERATION));

    assert!(association.c_echo()?.success);
    association.release()?;
    Ok(())
}

#[test]
fn store_object_read_from_file() -> Result<()> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let provider = ServiceProvider::new(scp_options()).with_store_handler(
        move |_: &str, obj: DefaultDicomObject| {
            sink.lock().unwrap().push(obj);
            status::SUCCESS
        },
    );
    let addr = spawn_provider(provider)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("instance.dcm");
    let mut obj = instance(7, "FILE");
    obj.set_transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN);
    obj.write_to_file(&path)?;
    let obj = dcm_object::open_file(&path)?;
    assert_eq!(obj.transfer_syntax(), uids::EXPLICIT_VR_LITTLE_ENDIAN);

    let mut association = connect(addr)?;
    let outcome = association.c_store(&obj)?;
    assert!(outcome.success, "{}", outcome);
    association.release()?;

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].transfer_syntax(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
    assert_eq!(text(&received[0], tags::PATIENT_ID), "FILE");
    // the file meta group is not part of the data set sent
    assert!(received[0].element(tags::TRANSFER_SYNTAX_UID).is_err());
    Ok(())
}

#[test]
fn store_without_presentation_context() -> Result<()> {
    let addr = spawn_provider(ServiceProvider::new(scp_options()))?;
    let mut association = ClientAssociationOptions::new()
        .calling_ae_title(SCU_AE_TITLE)
        .with_abstract_syntax(uids::VERIFICATION)
        .establish(addr)?;
    assert_matches!(
        association.c_store(&instance(0, "X")),
        Err(dimse::Error::NoPresentationContext { .. })
    );
    association.release()?;
    Ok(())
}

#[test]
fn find_patients() -> Result<()> {
    let store = InMemoryStore::new()
        .with_instance(instance(1, "A"))
        .with_instance(instance(2, "B"))
        .with_instance(instance(3, "B"));
    let addr = spawn_provider(ServiceProvider::new(scp_options()).with_find_handler(store))?;

    let mut association = connect(addr)?;
    let response = association.c_find(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND,
        &patient_query("B"),
    )?;
    assert!(response.outcome.success);
    assert_eq!(response.matches.len(), 2);
    for found in &response.matches {
        assert_eq!(text(found, tags::PATIENT_ID), "B");
    }

    let response = association.c_find(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND,
        &patient_query("NOBODY"),
    )?;
    assert!(response.outcome.success);
    assert!(response.matches.is_empty());
    association.release()?;
    Ok(())
}

/// Produces matches slowly, so that a cancellation arrives midway.
struct SlowFind;

impl FindHandler for SlowFind {
    fn find<'a>(
        &'a self,
        _information_model: &str,
        _identifier: &DefaultDicomObject,
    ) -> Box<dyn Iterator<Item = DefaultDicomObject> + 'a> {
        Box::new((0..100).map(|n| {
            std::thread::sleep(Duration::from_millis(20));
            instance(n, "SLOW")
        }))
    }
}

#[test]
fn cancel_find() -> Result<()> {
    let addr = spawn_provider(ServiceProvider::new(scp_options()).with_find_handler(SlowFind))?;

    let mut association = connect(addr)?;
    let mut seen = 0;
    let outcome = association.c_find_with(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_FIND,
        &patient_query("SLOW"),
        |_| {
            seen += 1;
            ControlFlow::Break(())
        },
    )?;
    assert_eq!(seen, 1);
    assert_eq!(outcome.status, status::CANCEL);
    assert!(!outcome.success);

    // the association remains usable
    assert!(association.c_echo()?.success);
    association.release()?;
    Ok(())
}

#[test]
fn move_to_destination() -> Result<()> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let destination = ServiceProvider::new(
        ServerAssociationOptions::new()
            .ae_title(DESTINATION_AE_TITLE)
            .with_abstract_syntax(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    )
    .with_store_handler(move |calling_ae_title: &str, obj: DefaultDicomObject| {
        assert_eq!(calling_ae_title, SCP_AE_TITLE);
        sink.lock().unwrap().push(text(&obj, tags::SOP_INSTANCE_UID));
        status::SUCCESS
    });
    let destination_addr = spawn_provider(destination)?;

    let store = InMemoryStore::new()
        .with_instance(instance(1, "A"))
        .with_instance(instance(2, "B"))
        .with_instance(instance(3, "B"))
        .with_destination(DESTINATION_AE_TITLE, destination_addr.to_string());
    let addr = spawn_provider(ServiceProvider::new(scp_options()).with_move_handler(store))?;

    let mut association = connect(addr)?;
    let mut progress = Vec::new();
    let response = association.c_move_with(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE,
        DESTINATION_AE_TITLE,
        &patient_query("B"),
        |counters| {
            progress.push(counters);
            ControlFlow::Continue(())
        },
    )?;
    assert!(response.outcome.success, "{}", response.outcome);
    assert_eq!(response.outcome.status, status::SUCCESS);
    assert_eq!(response.sub_operations.completed, 2);
    assert_eq!(response.sub_operations.failed, 0);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].remaining, Some(1));
    assert_eq!(progress[0].completed, 1);

    let mut stored = received.lock().unwrap().clone();
    stored.sort();
    assert_eq!(
        stored,
        vec![
            "1.2.826.0.1.3680043.2.1125.2".to_string(),
            "1.2.826.0.1.3680043.2.1125.3".to_string(),
        ]
    );

    let response = association.c_move(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE,
        "NOWHERE",
        &patient_query("B"),
    )?;
    assert!(!response.outcome.success);
    assert_eq!(response.outcome.status, status::MOVE_DESTINATION_UNKNOWN);

    association.release()?;
    Ok(())
}

/// Matches more instances than a C-MOVE response can count.
struct Flood;

impl MoveHandler for Flood {
    fn instances(
        &self,
        _information_model: &str,
        _identifier: &DefaultDicomObject,
    ) -> Vec<DefaultDicomObject> {
        vec![DefaultDicomObject::new(); usize::from(u16::MAX) + 1]
    }

    fn destination(&self, _ae_title: &str) -> Option<String> {
        Some("127.0.0.1:1".to_string())
    }
}

#[test]
fn move_of_too_many_instances_is_refused() -> Result<()> {
    let addr = spawn_provider(ServiceProvider::new(scp_options()).with_move_handler(Flood))?;
    let mut association = connect(addr)?;
    let response = association.c_move(
        uids::PATIENT_ROOT_QUERY_RETRIEVE_INFORMATION_MODEL_MOVE,
        DESTINATION_AE_TITLE,
        &patient_query("ALL"),
    )?;
    assert!(!response.outcome.success);
    assert_eq!(
        response.outcome.status,
        status::UNABLE_TO_PERFORM_SUB_OPERATIONS
    );
    assert_eq!(response.sub_operations.completed, 0);
    association.release()?;
    Ok(())
}
