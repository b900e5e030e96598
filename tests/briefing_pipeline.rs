use lessoncast::audio::wav;
use lessoncast::briefing::planner;
use lessoncast::speech::backend::{MockReply, MockSpeechBackend};
use lessoncast::{
    BriefingPipeline, Config, DirAudioStore, LessonError, LessonSession, MemoryAudioStore,
    PlaylistAssembler, SpeechSynthesizer,
};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

fn lesson_text(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| format!("Topic {i}. The instructor explains idea number {i} to the student."))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn pcm_ramp(samples: i16) -> Vec<u8> {
    (0..samples).flat_map(|s| (s * 10).to_le_bytes()).collect()
}

#[tokio::test(start_paused = true)]
async fn playlist_order_matches_chunk_order() {
    let backend = Arc::new(MockSpeechBackend::new("mock"));
    let store = Arc::new(MemoryAudioStore::new());
    let synthesizer = SpeechSynthesizer::new(backend.clone(), store);

    let chunks = planner::plan(&lesson_text(6), 8);
    let playlist = PlaylistAssembler::new(&synthesizer)
        .build_playlist(&chunks, "summary", Duration::from_millis(1000))
        .await;

    assert_eq!(playlist.len(), chunks.len());
    for (k, section) in playlist.iter().enumerate() {
        assert_eq!(section.id, format!("summary-{k}"));
        assert_eq!(section.title, chunks[k].label);
    }
    let sent: Vec<_> = chunks.iter().map(|c| c.text.clone()).collect();
    assert_eq!(backend.calls(), sent);
}

#[tokio::test(start_paused = true)]
async fn designated_failures_are_omitted() {
    let backend = MockSpeechBackend::new("mock")
        .with_failure_for("idea number 0")
        .with_failure_for("idea number 4")
        .with_failure_for("idea number 5");
    let synthesizer =
        SpeechSynthesizer::new(Arc::new(backend), Arc::new(MemoryAudioStore::new()));

    let chunks = planner::plan(&lesson_text(6), 8);
    let playlist = PlaylistAssembler::new(&synthesizer)
        .build_playlist(&chunks, "deepdive", Duration::ZERO)
        .await;

    let ids: Vec<_> = playlist.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec!["deepdive-1", "deepdive-2", "deepdive-3"]);
    assert_eq!(playlist.skipped, vec![0, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn stored_containers_decode_with_generic_reader() {
    let pcm = pcm_ramp(1200);
    let backend = MockSpeechBackend::new("mock").with_default_pcm(pcm.clone());
    let store = Arc::new(MemoryAudioStore::new());
    let pipeline =
        BriefingPipeline::from_config(&Config::default(), Arc::new(backend), store.clone())
            .unwrap();

    let playlist = pipeline.summary(&lesson_text(2)).await.unwrap();
    assert_eq!(playlist.len(), 2);

    for section in &playlist {
        let bytes = store.get(&section.audio_url).unwrap();
        assert_eq!(bytes.len(), 44 + pcm.len());

        let reader = hound::WavReader::new(Cursor::new(bytes.to_vec())).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize * 2, pcm.len());

        let info = wav::probe(&bytes).unwrap();
        assert_eq!(info.data_len, pcm.len());
        assert_eq!(section.duration, Some(info.duration_secs));
    }
}

#[tokio::test(start_paused = true)]
async fn rate_limited_chunk_recovers_within_budget() {
    let backend = MockSpeechBackend::new("mock").with_script([
        MockReply::RateLimited,
        MockReply::RateLimited,
        MockReply::RateLimited,
    ]);
    let backend = Arc::new(backend);
    let pipeline = BriefingPipeline::from_config(
        &Config::default(),
        backend.clone(),
        Arc::new(MemoryAudioStore::new()),
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    let playlist = pipeline.summary(&lesson_text(2)).await.unwrap();

    assert_eq!(playlist.len(), 2);
    assert_eq!(backend.call_count(), 5);
    // 2s + 4s + 6s backoff on the first chunk, 1s pause before the second
    assert_eq!(start.elapsed(), Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn all_chunks_failing_yields_empty_playlist_not_error() {
    let backend = MockSpeechBackend::new("mock").with_failure_for("Topic");
    let pipeline = BriefingPipeline::from_config(
        &Config::default(),
        Arc::new(backend),
        Arc::new(MemoryAudioStore::new()),
    )
    .unwrap();

    let playlist = pipeline.summary(&lesson_text(3)).await.unwrap();
    assert!(playlist.is_empty());
    assert_eq!(playlist.skipped, vec![0, 1, 2]);
}

#[tokio::test]
async fn undecomposable_document_is_pipeline_error() {
    let pipeline = BriefingPipeline::from_config(
        &Config::default(),
        Arc::new(MockSpeechBackend::new("mock")),
        Arc::new(MemoryAudioStore::new()),
    )
    .unwrap();

    assert!(matches!(
        pipeline.summary("").await,
        Err(LessonError::PlanningFailed { .. })
    ));
    assert!(matches!(
        pipeline.deep_dive("{\"not\": \"an array\"}").await,
        Err(LessonError::PlanningFailed { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn session_with_dir_store_cleans_up_files() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = Arc::new(DirAudioStore::new(tmp.path().join("audio")).unwrap());
    let pipeline = BriefingPipeline::from_config(
        &Config::default(),
        Arc::new(MockSpeechBackend::new("mock")),
        store.clone(),
    )
    .unwrap();

    let mut session = LessonSession::new(store.clone());
    session.replace_summary(pipeline.summary(&lesson_text(3)).await.unwrap());
    let deep_dive = pipeline
        .deep_dive(r#"[{"topicTitle":"Stalls","teachingScript":"Explain the critical angle."}]"#)
        .await
        .unwrap();
    session.replace_deep_dive(deep_dive);

    let paths: Vec<_> = session
        .audio_refs()
        .iter()
        .map(|r| store.path_of(r).unwrap())
        .collect();
    assert_eq!(paths.len(), 4);
    assert!(paths.iter().all(|p| p.exists()));

    session.close();
    assert!(paths.iter().all(|p| !p.exists()));
}
