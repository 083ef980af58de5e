// src/config/defaults.rs
//! Built-in lookup tables.

use std::collections::BTreeMap;

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// Canonical species label → known aliases (common, scientific, cultivar
/// names and observed misspellings).
pub fn species_aliases() -> BTreeMap<String, Vec<String>> {
    table(&[
        (
            "Apple",
            &[
                "apple",
                "apple (malus domestica)",
                "apples",
                "dwarf apple",
                "granny smith",
                "honeycrisp",
                "honeycrisp apple",
                "red apple",
                "malus domestica",
                "crabapple",
            ],
        ),
        ("Ash", &["ash"]),
        ("Beech", &["beech", "american beech", "fagus grandifolia"]),
        (
            "Birch",
            &["birch", "river birch", "river birch (betula nigra)"],
        ),
        (
            "Buckeye",
            &["buckeye", "aesculus glabra", "ohio buckeye", "red buckeye"],
        ),
        ("Catalpa", &["catalpa", "northern catalpa"]),
        ("Cedar", &["cedar", "white cedar", "thuja occidentalis"]),
        (
            "Cherry",
            &[
                "cherry",
                "lapins cherry",
                "rainier cherry",
                "stella cherry",
                "sand cherry tree",
            ],
        ),
        (
            "Kentucky Coffeetree",
            &[
                "coffee",
                "coffeetree",
                "kentucky coffee",
                "kentucky coffee tree",
                "gymnocladus dioicus",
                "gymnocladus dioicus-kentucky coffee tree",
            ],
        ),
        ("Cypress", &["cypress", "bald cypress"]),
        (
            "Dogwood",
            &["dogwood", "japanese dogwood", "pagoda dogwood", "pagoda_dogwood"],
        ),
        (
            "Elm",
            &[
                "elm",
                "american elm",
                "ulmus americana",
                "ulmus americana \"princeton\"",
                "ulmus x \"morton glossy\"",
            ],
        ),
        ("Fringe Tree", &["fringetree", "fringe tree"]),
        ("Ginkgo", &["ginkgo"]),
        ("Gum", &["gum", "sweet gum"]),
        (
            "Hackberry",
            &[
                "hackberry",
                "hack berry",
                "celtis occidentalis",
                "celtis occidentalis-hackberry",
                "common hackberry",
                "sugarberry",
            ],
        ),
        (
            "Hazelnut",
            &[
                "hazelnut",
                "hedges of hazelnuts",
                "american hazelnut (corylus americana)",
                "corylus americana",
            ],
        ),
        (
            "Hickory",
            &[
                "butternut hickory",
                "shagbark hickory",
                "carya ovata",
                "butternut",
            ],
        ),
        (
            "Honeylocust",
            &[
                "honeylocust",
                "thornless honeylocust",
                "gleditsia triacanthos",
                "gleditsia triacanthos inermis \"shademaster\"",
                "locust",
            ],
        ),
        (
            "Hornbeam",
            &[
                "hornbeam",
                "american hornbeam",
                "carpinus caroliniana",
                "hophornbeam",
                "ostrya virginiana",
            ],
        ),
        (
            "Linden",
            &["linden", "american linden", "littleleaf linden", "basswood"],
        ),
        (
            "Maple",
            &[
                "maple",
                "red maple",
                "acer rubrum",
                "sugar maple",
                "autumn blaze maple",
                "red sunset maple",
                "acer x freemanii `jeffsred`",
                "memorial tree (red maple)",
            ],
        ),
        (
            "Oak",
            &[
                "oak",
                "bur oak",
                "burr oak",
                "northern red oak",
                "quercus rubra",
                "red oak",
                "white oak",
                "chinkapin oak",
                "chinquapin oak",
                "northern red oak (quercus rubra)",
                "northern_red_oak",
                "oak species",
                "quercus alba",
                "quercus bicolor",
                "swamp white oak",
                "shingle oak",
                "shumard oak",
                "quercus shumardii",
                "quercus imbricaria",
                "quercus x schuetti",
                "swamp white oak (quercus alba)",
                "chinquapin",
            ],
        ),
        (
            "Pawpaw",
            &[
                "paw paw",
                "paw paw (asimina triloba)",
                "pawpaw",
                "pennsylvania golden pawpaw",
                "sunflower pawpaw",
                "asimina triloba",
                "sunflower",
            ],
        ),
        (
            "Peach",
            &[
                "peach",
                "elberta peach",
                "harvester peach",
                "majestic peach",
                "peach tree",
                "peaches",
            ],
        ),
        (
            "Pear",
            &[
                "pear",
                "pear (pyrus communis)",
                "pear_tree",
                "pears",
                "ornamental pear",
                "pyrus communis",
            ],
        ),
        (
            "Pecan",
            &["pecan", "northern pecan", "carya illinoinensis", "pecan tree"],
        ),
        ("Pine", &["pine", "eastern white pine", "white pine"]),
        ("Plum", &["plum", "plums", "american plum"]),
        (
            "Redbud",
            &[
                "redbud",
                "eastern redbud",
                "eastern red bud",
                "cercis canadensis",
                "eastern redbud (cercis canadensis)",
                "redbud eastern",
            ],
        ),
        (
            "Serviceberry",
            &[
                "serviceberry",
                "allegheny serviceberry",
                "amelanchier laevis",
                "service berry",
                "service berry (amenlanchier)",
                "serviceberry (amelanchier arborea)",
            ],
        ),
        ("Spruce", &["spruce", "dwarf alberta spruce"]),
        (
            "Sycamore",
            &[
                "sycamore",
                "american sycamore",
                "platanus occidentalis",
                "platanus occidentalis-sycamore",
            ],
        ),
        (
            "Tulip Tree",
            &[
                "tulip",
                "tulip poplar",
                "tulip tree",
                "tuliptree",
                "liriodendron tulipifera",
                "liriodendron tulipifera-tulip poplar",
            ],
        ),
        ("Walnut", &["walnut"]),
        (
            "Unspecified/Generic",
            &[
                "count",
                "species",
                "tree",
                "others",
                "unspecified",
                "threefold",
                "street trees (not specified)",
                "shade trees",
                "native trees",
                "indiana native (undetermined)",
                "fruit bearing trees",
                "large fruit and nut trees",
                "small fruit trees",
                "espaliered fruit trees",
            ],
        ),
    ])
}

pub fn goal_keywords() -> BTreeMap<String, Vec<String>> {
    table(&[
        (
            "Environmental & Climate",
            &[
                "environment",
                "sustainability",
                "climate",
                "canopy",
                "green",
                "beautification",
                "ecosystem",
                "air quality",
                "stormwater",
                "biodiversity",
            ],
        ),
        (
            "Youth & Education",
            &[
                "education",
                "youth",
                "students",
                "learning",
                "school",
                "educational",
                "stem",
            ],
        ),
        (
            "Community Building",
            &[
                "community",
                "engagement",
                "neighborhood",
                "beautify",
                "volunteer",
                "public",
                "space",
                "gathering",
                "social",
            ],
        ),
        (
            "Workforce & Economic",
            &[
                "workforce",
                "job",
                "skills",
                "economic",
                "employment",
                "career",
                "development",
            ],
        ),
        (
            "Food & Agriculture",
            &["food", "agriculture", "orchard", "fruit", "harvest", "garden"],
        ),
    ])
}

pub fn tree_types() -> BTreeMap<String, Vec<String>> {
    table(&[
        (
            "Fruit & Nut",
            &[
                "Apple", "Cherry", "Hazelnut", "Hickory", "Pawpaw", "Peach", "Pear", "Pecan",
                "Plum", "Walnut",
            ],
        ),
        (
            "Shade Trees",
            &[
                "Ash",
                "Beech",
                "Birch",
                "Buckeye",
                "Catalpa",
                "Elm",
                "Ginkgo",
                "Gum",
                "Hackberry",
                "Honeylocust",
                "Hornbeam",
                "Kentucky Coffeetree",
                "Linden",
                "Maple",
                "Oak",
                "Sycamore",
                "Tulip Tree",
            ],
        ),
        (
            "Ornamental/Flowering",
            &["Dogwood", "Fringe Tree", "Redbud", "Serviceberry"],
        ),
        (
            "Evergreens/Conifers",
            &["Cedar", "Cypress", "Pine", "Spruce"],
        ),
        ("Unspecified/Native", &["Unspecified/Generic"]),
    ])
}

pub fn state_names() -> BTreeMap<String, String> {
    [("ILLINOIS", "IL"), ("INDIANA", "IN"), ("WISCONSIN", "WI")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
