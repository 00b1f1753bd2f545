//! Tests for the finalization pipeline.

use super::*;
use crate::artefact::extraction::ZipExtractor;
use crate::config::FinalizeConfig;
use crate::test_utils::write_zip;
use std::cell::RefCell;

const MANIFEST: &str = r#"{
  "foo": { "sdk_name": "foo-sdk", "module_sdk_project": "prebuilts/module_foo" },
  "bar": { "sdk_name": "bar-sdk", "module_sdk_project": "prebuilts/module_bar" }
}"#;

type Archive = (&'static str, Vec<(&'static str, &'static [u8])>);

/// Serves a fixed manifest and writes the configured archives for every
/// SDK request.
struct FakeSource {
    archives: Vec<Archive>,
    requests: RefCell<Vec<ArtefactRequest>>,
}

impl FakeSource {
    fn new(archives: Vec<Archive>) -> Self {
        Self {
            archives,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl ArtefactSource for FakeSource {
    fn fetch(
        &self,
        request: &ArtefactRequest,
        dest_dir: &Utf8Path,
        _stderr: &mut dyn Write,
    ) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        match request {
            ArtefactRequest::ModulesInfo => {
                std::fs::write(dest_dir.join(MODULES_INFO), MANIFEST)?;
            }
            ArtefactRequest::Sdks { .. } => {
                for (name, entries) in &self.archives {
                    write_zip(&dest_dir.join(name), entries);
                }
            }
        }
        Ok(())
    }
}

fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
    (dir, path)
}

fn foo_test_exports() -> Archive {
    (
        "foo-sdk-test-exports.zip",
        vec![
            ("Android.bp", b"module_exports_snapshot {}".as_slice()),
            ("sdk_library/public/foo.txt", b"// API".as_slice()),
        ],
    )
}

#[test]
fn imports_sdk_and_projects_api_files() {
    let (_guard, root) = utf8_tempdir();
    let layout = Layout::new(&root, false, &FinalizeConfig::default());
    let source = FakeSource::new(vec![foo_test_exports()]);
    let modules = vec!["*".to_owned()];
    let context = PipelineContext {
        version: 5,
        modules: &modules,
        layout: &layout,
        source: &source,
        extractor: &ZipExtractor,
    };

    let mut stderr = Vec::new();
    let touched = finalize_prebuilts(&context, &mut stderr).expect("finalize");

    let target = root.join("prebuilts/module_foo/5/test-exports");
    assert!(target.join("Android.bp.auto").is_file());
    assert!(!target.join("Android.bp").exists());
    assert_eq!(
        std::fs::read_to_string(root.join("prebuilts/sdk/extensions/5/public/api/foo.txt"))
            .expect("read projected api"),
        "// API"
    );

    let module_repo = root.join("prebuilts/module_foo");
    let compat_repo = root.join("prebuilts/sdk");
    let repos: Vec<_> = touched.repos().map(Utf8Path::to_owned).collect();
    assert_eq!(repos, vec![module_repo.clone(), compat_repo.clone()]);
    assert_eq!(
        touched.paths(&module_repo).collect::<Vec<_>>(),
        vec!["5/test-exports"]
    );
    assert_eq!(
        touched.paths(&compat_repo).collect::<Vec<_>>(),
        vec!["extensions/5/public/api"]
    );

    let log = String::from_utf8(stderr).expect("utf8");
    assert!(log.contains(&format!("module_sdk_path for foo: {module_repo}")));
    assert!(log.contains(&format!("Created {target}")));
}

#[test]
fn requests_manifest_then_each_module() {
    let (_guard, root) = utf8_tempdir();
    let layout = Layout::new(&root, false, &FinalizeConfig::default());
    let source = FakeSource::new(Vec::new());
    let modules = vec!["foo".to_owned(), "bar".to_owned()];
    let context = PipelineContext {
        version: 5,
        modules: &modules,
        layout: &layout,
        source: &source,
        extractor: &ZipExtractor,
    };

    let mut stderr = Vec::new();
    let touched = finalize_prebuilts(&context, &mut stderr).expect("finalize");
    assert!(touched.is_empty());
    assert_eq!(
        *source.requests.borrow(),
        vec![
            ArtefactRequest::ModulesInfo,
            ArtefactRequest::Sdks {
                module: "foo".to_owned()
            },
            ArtefactRequest::Sdks {
                module: "bar".to_owned()
            },
        ]
    );
    assert!(
        String::from_utf8(stderr)
            .expect("utf8")
            .contains("No SDK archives were retrieved.")
    );
}

#[test]
fn removes_previous_snapshot_before_fetching() {
    let (_guard, root) = utf8_tempdir();
    let stale = root.join("prebuilts/sdk/extensions/5/system/api/old.txt");
    std::fs::create_dir_all(stale.parent().expect("parent")).expect("create stale dir");
    std::fs::write(&stale, "old").expect("write stale");

    let layout = Layout::new(&root, false, &FinalizeConfig::default());
    let source = FakeSource::new(vec![foo_test_exports()]);
    let modules = vec!["*".to_owned()];
    let context = PipelineContext {
        version: 5,
        modules: &modules,
        layout: &layout,
        source: &source,
        extractor: &ZipExtractor,
    };

    finalize_prebuilts(&context, &mut Vec::new()).expect("finalize");
    assert!(!stale.exists());
    assert!(root.join("prebuilts/sdk/extensions/5/public/api/foo.txt").is_file());
}

#[test]
fn unmapped_archive_aborts_the_run() {
    let (_guard, root) = utf8_tempdir();
    let layout = Layout::new(&root, false, &FinalizeConfig::default());
    let source = FakeSource::new(vec![(
        "mystery.zip",
        vec![("Android.bp", b"".as_slice())],
    )]);
    let modules = vec!["*".to_owned()];
    let context = PipelineContext {
        version: 5,
        modules: &modules,
        layout: &layout,
        source: &source,
        extractor: &ZipExtractor,
    };

    let err = finalize_prebuilts(&context, &mut Vec::new()).expect_err("unmapped");
    assert_eq!(
        err.to_string(),
        "\"mystery.zip\" has no valid mapping to any mainline module."
    );
}
