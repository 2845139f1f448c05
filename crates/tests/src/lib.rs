#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod assessment_tests;
#[cfg(test)]
mod attempt_tests;
#[cfg(test)]
mod passage_tests;
#[cfg(test)]
mod recitation_tests;
#[cfg(test)]
mod transcription_tests;
