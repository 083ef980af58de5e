use anyhow::Result;
use std::{fs, path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use treegrant::{
    load_project_data,
    report::{self, LabelCount, LabelTrees},
    EnrichedProjectRecord, Pipeline, PipelineConfig, RuleLemmatizer, Summary, ALL_ORGANIZATIONS,
};

const PROJECTS: &str = "\
Organization Name,Project Description,Project Location City,Project Location State,Latitude,Longitude,# Trees To Be Planted,Contact Email
Grace Church,Community orchard,Chicago,Illinois,41.88,-87.63,20,grace@example.org
Grace Church,Shade for school,Chicago,IL,41.89,-87.62,15,grace@example.org
St. Mark,Parking lot canopy,Gary,indiana,41.60,-87.34,8,mark@example.org
Hope Center,Pocket park,Toledo,Ohio,41.65,-83.54,5,hope@example.org
Broken Row,Bad coordinates,Nowhere,WI,not a number,-88.0,3,broken@example.org
";

const ANNOTATIONS: &str = r#"Organization Name,Project Description,Species from Ollama,USDA Matched Species,Goals from Ollama
Grace Church,Community orchard,"{'apple': {'count': 3}, 'Red Oak': {}}","['Apple (Malus domestica)', 'Quercus rubra']","['community orchard', 'food security']"
Grace Church,Community orchard,"{'apple': {'count': 3}, 'Red Oak': {}}","['Apple (Malus domestica)', 'Quercus rubra']","['community orchard', 'food security']"
Grace Church,Shade for school,"{'sugar maple': {}}",[],['shade for students']
St. Mark,Parking lot canopy,not a literal,['Acer rubrum'],"['tree canopy', 'stormwater']"
"#;

struct Fixture {
    _dir: TempDir,
    projects: PathBuf,
    annotations: PathBuf,
}

fn fixture() -> Result<Fixture> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();

    let dir = TempDir::new()?;
    let projects = dir.path().join("projects.csv");
    let annotations = dir.path().join("annotations.csv");
    fs::write(&projects, PROJECTS)?;
    fs::write(&annotations, ANNOTATIONS)?;
    Ok(Fixture {
        _dir: dir,
        projects,
        annotations,
    })
}

fn by_description<'a>(
    records: &'a [&'a EnrichedProjectRecord],
    description: &str,
) -> &'a EnrichedProjectRecord {
    records
        .iter()
        .find(|r| r.description == description)
        .copied()
        .unwrap_or_else(|| panic!("no record for {description}"))
}

fn counts(rows: &[(&str, usize)]) -> Vec<LabelCount> {
    rows.iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count: *count,
        })
        .collect()
}

#[test]
fn builds_enriched_table_from_csv_files() -> Result<()> {
    let fx = fixture()?;
    let pipeline = Pipeline::new(PipelineConfig::default());
    let out = pipeline.build_from_paths(&fx.projects, &fx.annotations)?;

    let report = &out.report;
    assert_eq!(report.join_columns, vec!["Organization Name", "Project Description"]);
    assert_eq!(report.project_rows, 5);
    assert_eq!(report.annotation_rows, 4);
    assert_eq!(report.annotation_rows_deduped, 3);
    assert!(report.conflicting_keys.is_empty());
    assert_eq!(report.unmatched_projects, 1);
    assert_eq!(report.enriched_rows, 4);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].row, 5);
    assert_eq!(report.dropped[0].key, vec!["Broken Row", "Bad coordinates"]);

    let records = out.table.view();
    assert_eq!(records.len(), 4);

    let orchard = by_description(&records, "Community orchard");
    assert!(orchard.annotated);
    assert_eq!(orchard.state.as_deref(), Some("IL"));
    assert_eq!(orchard.trees, 20);
    assert_eq!(
        orchard.all_species,
        vec!["Apple (Malus domestica)", "Quercus rubra", "Red Oak", "apple"]
    );
    assert_eq!(orchard.cleaned_species, vec!["Apple", "Oak"]);
    assert_eq!(
        orchard.goal_categories,
        vec!["Community Building", "Food & Agriculture"]
    );
    assert_eq!(
        orchard.extra.get("Contact Email").map(String::as_str),
        Some("grace@example.org")
    );

    let school = by_description(&records, "Shade for school");
    assert_eq!(school.cleaned_species, vec!["Maple"]);
    assert_eq!(school.goal_categories, vec!["Youth & Education"]);

    let canopy = by_description(&records, "Parking lot canopy");
    assert_eq!(canopy.state.as_deref(), Some("IN"));
    assert!(canopy.species_mentions.is_empty(), "malformed literal reads as empty");
    assert_eq!(canopy.cleaned_species, vec!["Maple"]);
    assert_eq!(canopy.goal_categories, vec!["Environmental & Climate"]);

    let park = by_description(&records, "Pocket park");
    assert!(!park.annotated);
    assert_eq!(park.state.as_deref(), Some("Other/Invalid"));
    assert!(park.all_species.is_empty());
    assert_eq!(park.goal_categories, vec!["General Improvement"]);

    let one_shot =
        treegrant::build_from_paths(&fx.projects, &fx.annotations, &PipelineConfig::default())?;
    assert_eq!(one_shot.table.len(), out.table.len());
    Ok(())
}

#[test]
fn every_record_is_well_formed() -> Result<()> {
    let fx = fixture()?;
    let pipeline = Pipeline::new(PipelineConfig::default());
    let out = pipeline.build_from_paths(&fx.projects, &fx.annotations)?;
    let species = &pipeline.normalizers().species;

    for r in out.table.records() {
        assert!(r.latitude.is_finite() && r.longitude.is_finite());
        assert!(!r.goal_categories.is_empty());

        let mut sorted = r.cleaned_species.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(r.cleaned_species, sorted);
        assert_eq!(species.normalize(&r.cleaned_species), r.cleaned_species);
        assert_eq!(species.normalize(&r.all_species), r.cleaned_species);
    }
    Ok(())
}

#[test]
fn dashboard_views_over_full_and_filtered_tables() -> Result<()> {
    let fx = fixture()?;
    let pipeline = Pipeline::new(PipelineConfig::default());
    let out = pipeline.build_from_paths(&fx.projects, &fx.annotations)?;

    let all = out.table.filter_organizations(&[ALL_ORGANIZATIONS]);
    let summary = Summary::compute(&all, pipeline.normalizers(), &RuleLemmatizer);

    assert_eq!(summary.metrics.total_trees, 48);
    assert_eq!(summary.metrics.organizations, 3);
    assert_eq!(summary.metrics.cities, 3);
    assert_eq!(summary.species, counts(&[("Maple", 2)]));
    assert_eq!(summary.multi_goal.multi_category, 1);
    assert!((summary.multi_goal.percent - 25.0).abs() < 1e-9);
    assert_eq!(
        summary.trees_per_category.first(),
        Some(&LabelTrees {
            label: "Community Building".into(),
            trees: 20
        })
    );
    assert_eq!(
        summary.tree_types,
        counts(&[("Shade Trees", 3), ("Fruit & Nut", 1)])
    );
    assert!(summary
        .goal_words
        .iter()
        .any(|w| w.label == "canopy" && w.count == 1));
    assert!(summary.goal_words.iter().all(|w| w.label != "student"));

    let only_mark = out.table.filter_organizations(&["St. Mark"]);
    assert_eq!(only_mark.len(), 1);
    let points = report::map_points(&only_mark);
    assert_eq!(points[0].species, "Maple");
    assert_eq!(points[0].trees, 8);

    assert_eq!(
        out.table.organization_names(),
        vec!["Grace Church", "Hope Center", "St. Mark"]
    );
    Ok(())
}

#[test]
fn yaml_config_overrides_defaults() -> Result<()> {
    let fx = fixture()?;
    let cfg_path = fx.projects.with_file_name("pipeline.yaml");
    fs::write(&cfg_path, "default_category: Misc\nother_bucket: Unsorted\n")?;

    let pipeline = Pipeline::new(PipelineConfig::from_path(&cfg_path)?);
    let out = pipeline.build_from_paths(&fx.projects, &fx.annotations)?;
    let records = out.table.view();
    assert_eq!(
        by_description(&records, "Pocket park").goal_categories,
        vec!["Misc"]
    );
    assert_eq!(pipeline.normalizers().tree_types.bucket("Baobab"), "Unsorted");
    assert_ne!(
        pipeline.fingerprint(),
        Pipeline::new(PipelineConfig::default()).fingerprint()
    );
    Ok(())
}

#[test]
fn cached_loads_share_one_build() -> Result<()> {
    let fx = fixture()?;
    let pipeline = Pipeline::new(PipelineConfig::default());

    let first = load_project_data(&pipeline, &fx.projects, &fx.annotations)
        .expect("first load yields data");
    let second = load_project_data(&pipeline, &fx.projects, &fx.annotations)
        .expect("second load yields data");
    assert!(Arc::ptr_eq(&first, &second));

    let missing = fx.projects.with_file_name("absent.csv");
    assert!(load_project_data(&pipeline, &missing, &fx.annotations).is_none());
    Ok(())
}
