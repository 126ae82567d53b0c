use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use certdir_common::{
    params::CertificateParams,
    views::{ApiErrorResponse, Certificate},
};
use http::StatusCode;
use tokio::sync::mpsc::UnboundedReceiver;

use super::*;
use crate::{
    error::ApiClientError,
    notify::{self, DirectoryEvent, Notice, NoticeLevel},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Lookup(String),
    Create(CertificateParams),
    Update(UpdateCertificateParams),
    Delete(String),
}

/// In-memory stand-in for the certificate endpoint that answers the way the
/// real server does and records every call.
#[derive(Default)]
struct FakeApi {
    records: Mutex<Vec<Certificate>>,
    calls: Mutex<Vec<Call>>,
    fail_list: AtomicBool,
    /// Every call other than `list` fails as if the connection dropped.
    offline: AtomicBool,
    /// Every call other than `list` stays pending until the flag is cleared.
    hang: AtomicBool,
    deny_admin: AtomicBool,
}

impl FakeApi {
    fn with(records: Vec<Certificate>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(status: StatusCode, error: &str) -> ApiClientError {
        ApiClientError::Rejected {
            status,
            body: ApiErrorResponse {
                error: Some(error.into()),
                message: None,
            },
        }
    }

    fn connection_reset() -> ApiClientError {
        ApiClientError::Decode {
            url: "http://certs.test/".into(),
            reason: "connection reset".into(),
        }
    }

    async fn reach(&self) -> Result<(), ApiClientError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Self::connection_reset());
        }
        Ok(())
    }

    fn check_admin(&self) -> Result<(), ApiClientError> {
        if self.deny_admin.load(Ordering::SeqCst) {
            return Err(Self::rejected(StatusCode::FORBIDDEN, "Access denied"));
        }
        Ok(())
    }
}

#[async_trait]
impl CertificateApi for FakeApi {
    async fn list(&self) -> Result<Vec<Certificate>, ApiClientError> {
        self.record(Call::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::connection_reset());
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn lookup(&self, id: &str) -> Result<Lookup, ApiClientError> {
        self.record(Call::Lookup(id.to_string()));
        self.reach().await?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|cert| cert.id == id)
            .cloned()
            .map_or(Lookup::NotFound, Lookup::Found))
    }

    async fn create(&self, params: &CertificateParams) -> Result<(), ApiClientError> {
        self.record(Call::Create(params.clone()));
        self.reach().await?;
        self.check_admin()?;

        let mut records = self.records.lock().unwrap();
        if records.iter().any(|cert| cert.id == params.id) {
            return Err(Self::rejected(
                StatusCode::CONFLICT,
                "A certificate with this ID already exists",
            ));
        }

        records.insert(
            0,
            Certificate {
                id: params.id.clone(),
                owner_name: params.owner_name.clone(),
                certificate_url: params.certificate_url.clone(),
                status: params.status.unwrap_or_default(),
                valid_from: params.valid_from,
                valid_until: params.valid_until,
                created_at: Some("2024-06-01 12:00:00".into()),
            },
        );
        Ok(())
    }

    async fn update(&self, params: &UpdateCertificateParams) -> Result<(), ApiClientError> {
        self.record(Call::Update(params.clone()));
        self.reach().await?;
        self.check_admin()?;

        let mut records = self.records.lock().unwrap();
        let Some(cert) = records.iter_mut().find(|cert| cert.id == params.id()) else {
            return Err(Self::rejected(StatusCode::NOT_FOUND, "Certificate not found"));
        };

        match params {
            UpdateCertificateParams::Replace(full) => {
                cert.owner_name = full.owner_name.clone();
                cert.certificate_url = full.certificate_url.clone();
                cert.status = full.status.unwrap_or_default();
                cert.valid_from = full.valid_from;
                cert.valid_until = full.valid_until;
            }
            UpdateCertificateParams::Status(partial) => cert.status = partial.status,
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiClientError> {
        self.record(Call::Delete(id.to_string()));
        self.reach().await?;
        self.check_admin()?;

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|cert| cert.id != id);
        if records.len() == before {
            return Err(Self::rejected(StatusCode::NOT_FOUND, "Certificate not found"));
        }
        Ok(())
    }
}

fn cert(id: &str, owner: &str) -> Certificate {
    Certificate {
        id: id.into(),
        owner_name: owner.into(),
        certificate_url: format!("https://example.com/{id}.pdf"),
        status: CertificateStatus::Valid,
        valid_from: None,
        valid_until: None,
        created_at: Some("2024-01-15 09:00:00".into()),
    }
}

fn directory(api: &Arc<FakeApi>) -> (Directory, UnboundedReceiver<DirectoryEvent>) {
    let (notifier, rx) = notify::channel();
    (Directory::new(api.clone(), notifier), rx)
}

fn drain(rx: &mut UnboundedReceiver<DirectoryEvent>) -> Vec<DirectoryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn notices(rx: &mut UnboundedReceiver<DirectoryEvent>) -> Vec<Notice> {
    drain(rx)
        .into_iter()
        .filter_map(|event| match event {
            DirectoryEvent::Notice(notice) => Some(notice),
            DirectoryEvent::RefreshFailed { .. } => None,
        })
        .collect()
}

fn fill_bob(directory: &mut Directory) {
    let draft = directory.draft_mut();
    draft.id = "CERT-2024-002".into();
    draft.owner_name = "Bob".into();
    draft.certificate_url = "https://example.com/CERT-2024-002.pdf".into();
}

#[tokio::test]
async fn test_lookup_found_returns_exact_record() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;

    let lookup = directory.lookup(" CERT-2024-001 ").await.unwrap();

    assert_eq!(lookup, Lookup::Found(cert("CERT-2024-001", "Alice")));
    assert_eq!(
        directory.state().lookup_result(),
        Some(&cert("CERT-2024-001", "Alice"))
    );
    assert_eq!(
        api.calls(),
        vec![Call::List, Call::Lookup("CERT-2024-001".into())]
    );
    assert_eq!(notices(&mut rx)[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_lookup_absent_does_not_touch_list() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;
    directory.lookup("CERT-2024-001").await.unwrap();

    let lookup = directory.lookup("CERT-2024-999").await.unwrap();

    assert_eq!(lookup, Lookup::NotFound);
    assert!(directory.state().lookup_result().is_none());
    assert_eq!(
        directory.state().certificates(),
        &[cert("CERT-2024-001", "Alice")]
    );

    let last = notices(&mut rx).pop().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Certificate not found");
}

#[tokio::test]
async fn test_lookup_blank_id_issues_no_request() {
    let api = FakeApi::with(vec![]);
    let (mut directory, mut rx) = directory(&api);

    let err = directory.lookup("   ").await.unwrap_err();

    assert!(matches!(
        err,
        DirectoryError::Validation(ValidationError::MissingId)
    ));
    assert!(api.calls().is_empty());
    assert_eq!(notices(&mut rx)[0].message, "Enter a certificate ID");
}

#[tokio::test]
async fn test_create_refreshes_once_and_clears_form() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    fill_bob(&mut directory);

    directory.create().await.unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], Call::Create(params) if params.id == "CERT-2024-002"));
    assert_eq!(calls[1], Call::List);
    assert_eq!(directory.state().draft(), &CertificateDraft::default());
    assert_eq!(directory.state().certificates().len(), 2);
    assert_eq!(notices(&mut rx)[0].message, "Certificate added");
}

#[tokio::test]
async fn test_create_with_empty_field_issues_no_request() {
    let api = FakeApi::with(vec![]);
    let (mut directory, mut rx) = directory(&api);
    fill_bob(&mut directory);
    directory.draft_mut().certificate_url.clear();

    let err = directory.create().await.unwrap_err();

    assert!(matches!(
        err,
        DirectoryError::Validation(ValidationError::MissingFields(ref fields))
            if fields == &vec!["certificate_url"]
    ));
    assert!(api.calls().is_empty());
    assert_eq!(directory.state().draft().owner_name, "Bob");
    assert_eq!(notices(&mut rx)[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_create_rejection_surfaces_server_message() {
    let api = FakeApi::with(vec![cert("CERT-2024-002", "Bob")]);
    let (mut directory, mut rx) = directory(&api);
    fill_bob(&mut directory);

    let err = directory.create().await.unwrap_err();

    assert_eq!(err.to_string(), "A certificate with this ID already exists");
    assert_eq!(api.calls().len(), 1);
    assert_eq!(directory.state().draft().id, "CERT-2024-002");
    assert_eq!(
        directory.state().last_error(),
        Some("A certificate with this ID already exists")
    );
    assert_eq!(
        notices(&mut rx),
        vec![Notice {
            level: NoticeLevel::Error,
            message: "A certificate with this ID already exists".into(),
        }]
    );
}

#[tokio::test]
async fn test_delete_declined_issues_no_request() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, _rx) = directory(&api);

    let outcome = directory
        .delete("CERT-2024-001", &|_: &str| false)
        .await
        .unwrap();

    assert_eq!(outcome, Deletion::Declined);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_delete_confirmed_refreshes_and_clears_matching_lookup() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice"), cert("CERT-2024-002", "Bob")]);
    let (mut directory, _rx) = directory(&api);
    directory.lookup("CERT-2024-001").await.unwrap();

    let prompts = Mutex::new(Vec::new());
    let confirm = |prompt: &str| {
        prompts.lock().unwrap().push(prompt.to_string());
        true
    };
    let outcome = directory.delete("CERT-2024-001", &confirm).await.unwrap();

    assert_eq!(outcome, Deletion::Deleted);
    assert_eq!(prompts.into_inner().unwrap(), vec!["Delete certificate?"]);
    assert_eq!(
        api.calls()[1..],
        [Call::Delete("CERT-2024-001".into()), Call::List]
    );
    assert!(directory.state().find("CERT-2024-001").is_none());
    assert!(directory.state().lookup_result().is_none());
}

#[tokio::test]
async fn test_delete_keeps_unrelated_lookup() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice"), cert("CERT-2024-002", "Bob")]);
    let (mut directory, _rx) = directory(&api);
    directory.lookup("CERT-2024-002").await.unwrap();

    directory
        .delete("CERT-2024-001", &|_: &str| true)
        .await
        .unwrap();

    assert_eq!(
        directory.state().lookup_result().map(|cert| cert.id.as_str()),
        Some("CERT-2024-002")
    );
}

#[tokio::test]
async fn test_delete_forbidden_keeps_list() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    api.deny_admin.store(true, Ordering::SeqCst);
    let (mut directory, _rx) = directory(&api);
    directory.refresh().await;

    let err = directory
        .delete("CERT-2024-001", &|_: &str| true)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Access denied");
    assert_eq!(directory.state().certificates().len(), 1);
    assert_eq!(api.calls().last(), Some(&Call::Delete("CERT-2024-001".into())));
}

#[tokio::test]
async fn test_status_change_sends_partial_body() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, _rx) = directory(&api);

    directory
        .set_status("CERT-2024-001", CertificateStatus::Invalid)
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![
            Call::Update(UpdateCertificateParams::Status(SetCertificateStatusParams {
                id: "CERT-2024-001".into(),
                status: CertificateStatus::Invalid,
            })),
            Call::List,
        ]
    );
    assert_eq!(
        directory.state().find("CERT-2024-001").map(|cert| cert.status),
        Some(CertificateStatus::Invalid)
    );
}

#[tokio::test]
async fn test_full_edit_sends_full_record_and_exits_edit_mode() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, _rx) = directory(&api);
    directory.refresh().await;

    let draft = directory.begin_edit("CERT-2024-001").unwrap();
    draft.owner_name = "Alice Smith".into();
    draft.valid_until = chrono::NaiveDate::from_ymd_opt(2025, 12, 31);
    directory.save_edit().await.unwrap();

    let calls = api.calls();
    assert_eq!(
        calls[1],
        Call::Update(UpdateCertificateParams::Replace(CertificateParams {
            id: "CERT-2024-001".into(),
            owner_name: "Alice Smith".into(),
            certificate_url: "https://example.com/CERT-2024-001.pdf".into(),
            status: Some(CertificateStatus::Valid),
            valid_from: None,
            valid_until: chrono::NaiveDate::from_ymd_opt(2025, 12, 31),
        }))
    );
    assert_eq!(calls[2], Call::List);
    assert!(directory.state().editing().is_none());
    assert_eq!(
        directory.state().find("CERT-2024-001").map(|cert| cert.owner_name.as_str()),
        Some("Alice Smith")
    );
}

#[tokio::test]
async fn test_failed_edit_stays_in_edit_mode() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    api.deny_admin.store(true, Ordering::SeqCst);
    let (mut directory, _rx) = directory(&api);
    directory.refresh().await;

    directory.begin_edit("CERT-2024-001").unwrap().owner_name = "Mallory".into();
    assert!(directory.save_edit().await.is_err());

    assert_eq!(
        directory.state().editing().map(|session| session.draft().owner_name.as_str()),
        Some("Mallory")
    );
}

#[tokio::test]
async fn test_edit_unknown_certificate_fails() {
    let api = FakeApi::with(vec![]);
    let (mut directory, _rx) = directory(&api);

    assert!(matches!(
        directory.begin_edit("CERT-2024-001"),
        Err(DirectoryError::UnknownCertificate { .. })
    ));
    assert!(matches!(
        directory.save_edit().await,
        Err(DirectoryError::NotEditing)
    ));
}

#[tokio::test]
async fn test_refresh_failure_keeps_list_and_is_only_published() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;

    api.fail_list.store(true, Ordering::SeqCst);
    directory.refresh().await;

    assert_eq!(directory.state().certificates().len(), 1);
    assert!(directory.state().last_error().is_none());

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], DirectoryEvent::RefreshFailed { .. }));
}

#[tokio::test]
async fn test_lookup_network_failure_reports_search_failed() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;
    api.offline.store(true, Ordering::SeqCst);

    let err = directory.lookup("CERT-2024-001").await.unwrap_err();

    assert!(matches!(err, DirectoryError::SearchFailed { .. }));
    assert!(directory.state().lookup_result().is_none());
    assert_eq!(directory.state().last_error(), Some("Search failed"));
    assert_eq!(
        directory.state().certificates(),
        &[cert("CERT-2024-001", "Alice")]
    );

    let last = notices(&mut rx).pop().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Search failed");
}

#[tokio::test]
async fn test_create_network_failure_keeps_form_and_list() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;
    fill_bob(&mut directory);
    api.offline.store(true, Ordering::SeqCst);

    let err = directory.create().await.unwrap_err();

    assert!(matches!(err, DirectoryError::Network { .. }));
    assert_eq!(directory.state().draft().owner_name, "Bob");
    assert_eq!(directory.state().last_error(), Some("Network error"));
    assert_eq!(
        directory.state().certificates(),
        &[cert("CERT-2024-001", "Alice")]
    );
    assert!(matches!(api.calls().last(), Some(Call::Create(_))));

    let last = notices(&mut rx).pop().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Network error");
}

#[tokio::test]
async fn test_save_edit_network_failure_stays_in_edit_mode() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;
    directory.begin_edit("CERT-2024-001").unwrap().owner_name = "Alice Smith".into();
    api.offline.store(true, Ordering::SeqCst);

    let err = directory.save_edit().await.unwrap_err();

    assert!(matches!(err, DirectoryError::Network { .. }));
    assert!(directory.state().editing().is_some());
    assert_eq!(directory.state().certificates()[0].owner_name, "Alice");
    assert_eq!(notices(&mut rx).pop().unwrap().message, "Network error");

    directory.cancel_edit();
    assert!(directory.state().editing().is_none());
}

#[tokio::test]
async fn test_delete_network_failure_keeps_list() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, mut rx) = directory(&api);
    directory.refresh().await;
    api.offline.store(true, Ordering::SeqCst);

    let err = directory
        .delete("CERT-2024-001", &|_: &str| true)
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::Network { .. }));
    assert_eq!(directory.state().last_error(), Some("Network error"));
    assert_eq!(
        directory.state().certificates(),
        &[cert("CERT-2024-001", "Alice")]
    );
    assert_eq!(
        api.calls(),
        vec![Call::List, Call::Delete("CERT-2024-001".into())]
    );
    assert_eq!(notices(&mut rx).pop().unwrap().message, "Network error");
}

#[tokio::test]
async fn test_cancelled_lookup_can_be_retried() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, _rx) = directory(&api);
    api.hang.store(true, Ordering::SeqCst);

    tokio::select! {
        biased;
        _ = directory.lookup("CERT-2024-001") => panic!("lookup should still be pending"),
        _ = std::future::ready(()) => {}
    }

    assert!(!directory.state().is_busy(Action::Lookup));

    api.hang.store(false, Ordering::SeqCst);
    let lookup = directory.lookup("CERT-2024-001").await.unwrap();
    assert_eq!(lookup, Lookup::Found(cert("CERT-2024-001", "Alice")));
}

#[tokio::test]
async fn test_cancelled_create_can_be_retried() {
    let api = FakeApi::with(vec![]);
    let (mut directory, _rx) = directory(&api);
    fill_bob(&mut directory);
    api.hang.store(true, Ordering::SeqCst);

    tokio::select! {
        biased;
        _ = directory.create() => panic!("create should still be pending"),
        _ = std::future::ready(()) => {}
    }

    assert!(!directory.state().is_busy(Action::Create));

    api.hang.store(false, Ordering::SeqCst);
    directory.create().await.unwrap();
    assert_eq!(directory.state().certificates().len(), 1);
}

#[tokio::test]
async fn test_certificate_lifecycle() {
    let api = FakeApi::with(vec![cert("CERT-2024-001", "Alice")]);
    let (mut directory, _rx) = directory(&api);
    directory.refresh().await;

    let Lookup::Found(found) = directory.lookup("CERT-2024-001").await.unwrap() else {
        panic!("CERT-2024-001 should be found");
    };
    assert_eq!(found.owner_name, "Alice");

    assert_eq!(
        directory.lookup("CERT-2024-999").await.unwrap(),
        Lookup::NotFound
    );

    fill_bob(&mut directory);
    directory.create().await.unwrap();
    directory.refresh().await;

    let mut ids: Vec<&str> = directory
        .state()
        .certificates()
        .iter()
        .map(|cert| cert.id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["CERT-2024-001", "CERT-2024-002"]);

    directory
        .delete("CERT-2024-001", &|_: &str| true)
        .await
        .unwrap();
    directory.refresh().await;

    let remaining = directory.state().certificates();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "CERT-2024-002");
    assert_eq!(remaining[0].owner_name, "Bob");
}
