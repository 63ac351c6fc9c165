use banksorter::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes one `sourceID` line per comma-separated ID found in the bank file
struct ListingDecoder;

impl BankDecoder for ListingDecoder {
    fn decode(&self, bank: &Path) -> Result<PathBuf> {
        let ids = fs::read_to_string(bank)?;
        let body: String = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| format!("<fld ty=\"tid\" na=\"sourceID\" va=\"{id}\"/>\n"))
            .collect();
        let out = PathBuf::from(format!("{}.xml", bank.display()));
        fs::write(&out, body)?;
        Ok(out)
    }
}

struct CopyTranscoder;

impl Transcoder for CopyTranscoder {
    fn transcode(&self, source: &Path, dest: &Path) -> Result<()> {
        fs::copy(source, dest)?;
        Ok(())
    }
}

struct Layout {
    _temp: TempDir,
    root: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let unpacked = root.join("UnpackedData");

        let banks = Partition::Shared.banks_source(&unpacked);
        fs::create_dir_all(&banks).unwrap();
        fs::write(banks.join("AMB_01.bnk"), "100, 101").unwrap();
        fs::write(banks.join("AMB_02.bnk"), "101, 300").unwrap();

        let sounds = Partition::Shared.sounds_source(&unpacked);
        fs::create_dir_all(&sounds).unwrap();
        for id in ["100", "101", "300", "999"] {
            fs::write(sounds.join(format!("{id}.wem")), format!("audio {id}")).unwrap();
        }

        let wiki = serde_json::json!({
            "Amb_[PAK]_Amb_01-_-AMB_01.bnk": {
                "url": "https://example.invalid/AMB_01",
                "content": "Index\nName\nIDs\n1\nFootsteps\n100, 101\n"
            }
        });
        fs::write(root.join("wiki_data.json"), wiki.to_string()).unwrap();

        Self { _temp: temp, root }
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_unpacked_data(self.root.join("UnpackedData"))
            .with_audio_converted(self.root.join("ConvertedAudio"))
            .with_banks_converted(self.root.join("ConvertedBanks"))
            .with_knowledge_base(self.root.join("wiki_data.json"))
            .with_partitions(vec![Partition::Shared])
            .with_workers(2)
    }

    fn sounds(&self) -> PathBuf {
        self.root.join("ConvertedAudio").join("Shared")
    }

    fn pipeline(&self, config: PipelineConfig) -> Pipeline {
        Pipeline::with_tools(config, Box::new(ListingDecoder), Box::new(CopyTranscoder))
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_full_run_groups_and_renames() {
    let layout = Layout::new();
    let summary = layout
        .pipeline(layout.config().with_stages(StageToggles::all()))
        .run()
        .unwrap();

    assert!(!summary.has_aborts());
    let shared = &summary.partitions[0];
    assert_eq!(shared.decode.report().unwrap().succeeded, 2);
    assert_eq!(shared.convert.report().unwrap().succeeded, 4);
    assert_eq!(shared.group.report().unwrap().moved, 3);
    assert_eq!(shared.rename.report().unwrap().renamed, 2);

    let sounds = layout.sounds();
    assert_eq!(
        file_names(&layout.root.join("ConvertedBanks").join("Shared").join("AMB_01")),
        vec!["AMB_01.bnk.xml"]
    );
    assert_eq!(
        file_names(&sounds.join("AMB_01")),
        vec!["Footsteps_0.wav", "Footsteps_1.wav"]
    );
    // 101 was claimed by AMB_01; AMB_02 has no wiki page
    assert_eq!(file_names(&sounds.join("AMB_02")), vec!["300.wem.wav"]);
    // Not referenced by any bank
    assert!(sounds.join("999.wem.wav").is_file());
    assert_eq!(
        fs::read_to_string(sounds.join("AMB_01").join("Footsteps_1.wav")).unwrap(),
        "audio 101"
    );
}

#[test]
fn test_second_organize_pass_changes_nothing() {
    let layout = Layout::new();
    layout
        .pipeline(layout.config().with_stages(StageToggles::all()))
        .run()
        .unwrap();
    let before = file_names(&layout.sounds().join("AMB_01"));

    let summary = layout
        .pipeline(layout.config().with_stages(StageToggles::default()))
        .run()
        .unwrap();

    let shared = &summary.partitions[0];
    assert_eq!(shared.decode, StageOutcome::Disabled);
    assert_eq!(shared.group.report().unwrap().moved, 0);
    assert_eq!(shared.rename.report().unwrap().renamed, 0);
    assert_eq!(file_names(&layout.sounds().join("AMB_01")), before);
}

#[test]
fn test_cancelled_before_start_runs_nothing() {
    let layout = Layout::new();
    let pipeline = layout.pipeline(layout.config().with_stages(StageToggles::all()));
    pipeline.cancellation_token().cancel();

    let summary = pipeline.run().unwrap();

    assert!(summary.cancelled);
    let shared = &summary.partitions[0];
    assert_eq!(shared.decode, StageOutcome::NotRun);
    assert_eq!(shared.rename, StageOutcome::NotRun);
    assert!(!layout.sounds().exists());
}

#[test]
fn test_dictionary_lists_bank_sounds() {
    let layout = Layout::new();
    let dictionary = layout.pipeline(layout.config()).build_dictionary().unwrap();

    assert_eq!(dictionary.bank_count(), 2);
    assert_eq!(dictionary.sound_count(), 4);
    let shared = &dictionary.partitions["Shared"];
    let amb = &shared["AMB_01"];
    assert_eq!(
        amb.sound_files.keys().collect::<Vec<_>>(),
        vec!["100", "101"]
    );
    assert_eq!(amb.sound_files["100"].wav_filename, "100.wem.wav");

    let out = layout.root.join("out").join("bg3_sounds.json");
    dictionary.save(&out).unwrap();
    let loaded = BankDictionary::load(&out).unwrap();
    assert_eq!(loaded.bank_count(), 2);
}
