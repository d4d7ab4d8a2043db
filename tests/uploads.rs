use std::collections::BTreeSet;
use std::sync::Arc;

use studio_store::{
    Error, MemoryObjectStore, MemoryStore, NewProject, ObjectStore, RecordStore, StoreConfig,
    UploadFile, Uploader,
};

fn setup() -> (RecordStore, MemoryObjectStore, Uploader) {
    let records = RecordStore::new(Arc::new(MemoryStore::new()), StoreConfig::default());
    let objects = MemoryObjectStore::new();
    let uploader = Uploader::new(records.clone(), Arc::new(objects.clone()));
    (records, objects, uploader)
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn upload_without_any_project_is_refused() {
    let (records, objects, uploader) = setup();

    let err = uploader
        .upload_images(
            "u1",
            "whatever",
            vec![UploadFile::new("a.jpg", b"pixels".to_vec())],
            &BTreeSet::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoProjects));
    assert_eq!(objects.stored_bytes().await, 0);
    assert!(records.project_images("u1", "whatever").await.is_empty());
}

#[tokio::test]
async fn batch_uploads_every_file_into_the_project() {
    let (records, objects, uploader) = setup();
    let project = records.create_project("u1", NewProject::new("Wedding")).await.unwrap();

    let files = (0..10)
        .map(|n| UploadFile::new(format!("DSC_{n:04}.jpg"), format!("frame {n}").into_bytes()))
        .collect();
    let report = uploader
        .upload_images("u1", &project.id, files, &tags(&["wedding", "outdoor"]))
        .await
        .unwrap();

    assert_eq!(report.success_count(), 10);
    assert_eq!(report.failure_count(), 0);

    let stored = records.project_images("u1", &project.id).await;
    assert_eq!(stored.len(), 10);
    assert!(stored.iter().all(|image| image.tags.contains("outdoor")));

    for image in &stored {
        let blob = objects.get(&image.url).await.unwrap().expect("blob stored");
        assert_eq!(blob.len() as u64, image.size_bytes);
    }
}

#[tokio::test]
async fn failed_files_are_reported_without_aborting_the_batch() {
    let (records, _, uploader) = setup();
    let project = records.create_project("u1", NewProject::new("Studio")).await.unwrap();

    let report = uploader
        .upload_images(
            "u1",
            &project.id,
            vec![
                UploadFile::new("good.jpg", b"data".to_vec()),
                UploadFile::new("empty.jpg", Vec::new()),
                UploadFile::new("also-good.jpg", b"more".to_vec()),
            ],
            &BTreeSet::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failed[0].filename, "empty.jpg");
    assert!(matches!(report.failed[0].error, Error::EmptyUpload(_)));
    assert_eq!(records.project_images("u1", &project.id).await.len(), 2);
}
