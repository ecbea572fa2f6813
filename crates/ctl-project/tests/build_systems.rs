use std::path::Path;

use ctl_core::Timebase;
use ctl_lti::{Lti, System};
use ctl_project::{build_systems, load};

fn demo(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn demos_load_and_build() {
    for name in ["disk_margins.yaml", "siso_loop.yaml"] {
        let project = load(&demo(name)).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        let systems =
            build_systems(&project).unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
        assert_eq!(systems.len(), project.systems.len());
    }
}

#[test]
fn connections_follow_signal_flow() {
    let project = load(&demo("disk_margins.yaml")).unwrap();
    let systems = build_systems(&project).unwrap();

    let lo = systems.require("output_loop").unwrap();
    let li = systems.require("input_loop").unwrap();
    let p = systems.require("plant").unwrap();
    let k = systems.require("controller").unwrap();
    assert_eq!(lo.name(), "Lo");
    assert!(matches!(lo, System::Ss(_)));

    let w = 3.0;
    let (pv, kv) = (p.eval_frequency(w).unwrap(), k.eval_frequency(w).unwrap());
    assert!((lo.eval_frequency(w).unwrap() - &pv * &kv).norm() < 1e-9);
    assert!((li.eval_frequency(w).unwrap() - &kv * &pv).norm() < 1e-9);

    let both = systems.require("both_loops").unwrap();
    assert_eq!((both.noutputs(), both.ninputs()), (4, 4));
}

#[test]
fn timebases_and_representations() {
    let project = load(&demo("siso_loop.yaml")).unwrap();
    let systems = build_systems(&project).unwrap();

    assert_eq!(systems.require("lag").unwrap().timebase(), Timebase::Discrete(Some(0.1)));
    assert_eq!(systems.require("loop").unwrap().timebase(), Timebase::Continuous);
    assert!(matches!(systems.require("closed_loop").unwrap(), System::Tf(_)));

    let measured = systems.require("measured").unwrap();
    let System::Frd(frd) = measured else {
        panic!("expected frequency data, got {}", measured.kind());
    };
    assert!(frd.is_smooth());
    assert!(frd.eval_one(0.5).is_ok());
    assert!(systems.get("missing").is_none());
    assert!(systems.require("missing").is_err());
}
