use std::collections::BTreeSet;
use std::io::Write;

use rand::SeedableRng;
use rand::rngs::StdRng;
use snowball_core::model::corpus::{CorpusSource, word_length};
use snowball_core::model::corpus_tables::CorpusTables;
use snowball_core::model::exclusion::ExclusionFilter;
use snowball_core::model::generation_config::GenerationConfig;
use snowball_core::model::generator::PoemBatchGenerator;
use snowball_core::model::sampler::WeightedSampler;
use snowball_core::model::seed::SeedPhrase;

const POEMS: [&str; 10] = [
	"i am the best",
	"i am all cold",
	"a an and band bands",
	"a at the they",
	"o on one bone bones",
	"i it its bits",
	"o ox box boxy",
	"a ax axe axes",
	"i in tin tiny",
	"o of off offs",
];

fn corpus_file(lines: &[&str]) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	for line in lines {
		writeln!(file, "{}", line).unwrap();
	}
	file
}

fn is_snowball(poem: &str) -> bool {
	let words: Vec<&str> = poem.split(' ').collect();
	words.windows(2).all(|pair| word_length(pair[1]) == word_length(pair[0]) + 1)
}

fn words(list: &[&str]) -> Vec<String> {
	list.iter().map(|w| (*w).to_owned()).collect()
}

#[test]
fn every_poem_grows_by_one_letter() {
	let tables = CorpusTables::from_lines(POEMS, true);
	let mut config = GenerationConfig::default();
	config.target = 200;
	config.failure_budget = 5_000;
	let mut rng = StdRng::seed_from_u64(1);

	let report = PoemBatchGenerator::new(&tables, &config).generate(None, &mut rng).unwrap();
	assert!(!report.poems.is_empty());
	for poem in &report.poems {
		assert!(is_snowball(poem), "not a snowball: {}", poem);
		assert_eq!(poem.split(' ').next().map(word_length), Some(1));
	}
}

#[test]
fn round_trip_of_a_single_record() {
	let corpus = corpus_file(&["a am jam"]);
	let tables = CorpusTables::build(&[CorpusSource::unweighted(corpus.path())], true).unwrap();

	let forward = |key: &[&str]| tables.forward().get(&words(key)).map(|c| c.distinct().join(" "));
	let backward = |key: &[&str]| tables.backward().get(&words(key)).map(|c| c.distinct().join(" "));
	assert_eq!(forward(&["a", "am"]).as_deref(), Some("jam"));
	assert_eq!(forward(&["a"]).as_deref(), Some("am"));
	assert_eq!(backward(&["am", "jam"]).as_deref(), Some("a"));
	assert_eq!(backward(&["jam"]).as_deref(), Some("am"));
	assert_eq!(tables.lengths().words(1), ["a"]);
	assert_eq!(tables.lengths().words(2), ["am"]);
	assert_eq!(tables.lengths().words(3), ["jam"]);
}

#[test]
fn building_the_same_sources_twice_is_identical() {
	let one = corpus_file(&POEMS[..5]);
	let two = corpus_file(&POEMS[5..]);
	let sources = [
		CorpusSource::new(one.path(), 2).unwrap(),
		CorpusSource::unweighted(two.path()),
	];

	let first = CorpusTables::build(&sources, true).unwrap();
	let second = CorpusTables::build(&sources, true).unwrap();
	assert_eq!(first, second);
}

#[test]
fn dead_branches_only_follow_recorded_transitions() {
	let tables = CorpusTables::from_lines(["i am the sea", "i am a car"], true);
	let mut config = GenerationConfig::default();
	config.target = 100;
	config.failure_budget = 1_000;
	let mut rng = StdRng::seed_from_u64(2);

	let seed = SeedPhrase::parse("i").unwrap();
	let report = PoemBatchGenerator::new(&tables, &config).generate(Some(&seed), &mut rng).unwrap();
	assert!(!report.poems.is_empty());
	for poem in &report.poems {
		let words: Vec<&str> = poem.split(' ').collect();
		for pair in words.windows(2) {
			if pair[0] == "am" {
				assert!(pair[1] == "the" || pair[1] == "a", "unexpected word after am in {}", poem);
			}
		}
	}
}

#[test]
fn excluded_characters_never_appear_above_the_threshold() {
	let tables = CorpusTables::from_lines(POEMS, true);
	let mut config = GenerationConfig::default();
	config.target = 100;
	config.failure_budget = 5_000;
	config.exclusion = ExclusionFilter::new("xyz", 3);
	let mut rng = StdRng::seed_from_u64(3);

	let report = PoemBatchGenerator::new(&tables, &config).generate(None, &mut rng).unwrap();
	assert!(!report.poems.is_empty());
	for word in report.poems.iter().flat_map(|poem| poem.split(' ')) {
		if word_length(word) >= 3 {
			assert!(!word.contains(['x', 'y', 'z']), "excluded word {}", word);
		}
	}
	// Shorter words stay exempt.
	assert!(report.poems.iter().any(|poem| poem.starts_with("o ox")));
}

#[test]
fn middle_seed_is_embedded_and_extended_both_ways() {
	let tables = CorpusTables::from_lines(POEMS, true);
	let mut config = GenerationConfig::default();
	config.target = 20;
	config.failure_budget = 2_000;
	let mut rng = StdRng::seed_from_u64(4);

	let seed = SeedPhrase::parse("the").unwrap();
	let report = PoemBatchGenerator::new(&tables, &config).generate(Some(&seed), &mut rng).unwrap();
	assert!(!report.poems.is_empty());
	for poem in &report.poems {
		assert!(is_snowball(poem), "not a snowball: {}", poem);
		assert!(poem.split(' ').any(|word| word == "the"));
		assert_eq!(poem.split(' ').next().map(word_length), Some(1));
	}
}

#[test]
fn unreachable_seed_exhausts_the_failure_budget() {
	let tables = CorpusTables::from_lines(["a am jam", "be bed beds"], true);
	let mut config = GenerationConfig::default();
	config.target = 10;
	config.failure_budget = 500;
	let mut rng = StdRng::seed_from_u64(5);

	let seed = SeedPhrase::parse("bed").unwrap();
	let report = PoemBatchGenerator::new(&tables, &config).generate(Some(&seed), &mut rng).unwrap();
	assert!(report.poems.is_empty());
	assert_eq!(report.failures, 500);
	assert!(report.budget_exhausted());
}

#[test]
fn random_mode_picks_one_word_per_length() {
	let tables = CorpusTables::from_lines(POEMS, true);
	let mut config = GenerationConfig::default();
	config.set_min_key_size(0).unwrap();
	config.set_begin_length(2).unwrap();
	config.set_end_length(Some(5)).unwrap();
	config.target = 50;
	let mut rng = StdRng::seed_from_u64(6);

	let report = PoemBatchGenerator::new(&tables, &config).generate(None, &mut rng).unwrap();
	assert_eq!(report.successes(), 50);
	for poem in &report.poems {
		let lengths: Vec<usize> = poem.split(' ').map(word_length).collect();
		assert_eq!(lengths, [2, 3, 4, 5]);
	}
}

#[test]
fn end_length_rejects_short_poems() {
	let tables = CorpusTables::from_lines(POEMS, true);
	let mut config = GenerationConfig::default();
	config.set_end_length(Some(5)).unwrap();
	config.target = 20;
	config.failure_budget = 5_000;
	let mut rng = StdRng::seed_from_u64(7);

	let report = PoemBatchGenerator::new(&tables, &config).generate(None, &mut rng).unwrap();
	assert!(!report.poems.is_empty());
	for poem in &report.poems {
		assert!(poem.split(' ').count() >= 5, "too short: {}", poem);
	}
}

#[test]
fn heavier_corpus_is_sampled_about_three_times_as_often() {
	let heavy = corpus_file(&["i in", "i it"]);
	let light = corpus_file(&["i is", "i id"]);
	let sources = [
		CorpusSource::new(heavy.path(), 3).unwrap(),
		CorpusSource::new(light.path(), 1).unwrap(),
	];
	let tables = CorpusTables::build(&sources, true).unwrap();
	let filter = ExclusionFilter::default();
	let sampler = WeightedSampler::new(tables.weights(), &filter);
	let candidates = tables.forward().get(&words(&["i"]));
	let mut rng = StdRng::seed_from_u64(8);

	let trials = 20_000;
	let heavy_words: BTreeSet<&str> = ["in", "it"].into();
	let hits = (0..trials)
		.filter(|_| sampler.sample(candidates, &mut rng).is_some_and(|word| heavy_words.contains(word)))
		.count();
	let ratio = hits as f64 / (trials - hits) as f64;
	assert!((2.6..3.4).contains(&ratio), "ratio was {}", ratio);
}
