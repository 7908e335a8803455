use super::mock::{
    BagOfWordsSimilarity, BrightnessLabeler, CapitalizedEntities, EchoTranslator,
    ExtractiveSummarizer, LexiconSentiment, MockTextGenerator, OverlapQuestionAnswerer,
};
use super::{
    EntityExtractor, ImageLabeler, LazyService, QuestionAnswerer, SentimentClassifier,
    SimilarityScorer, Summarizer, TextGenerator, Translator,
};
use std::sync::Arc;

/// One lazily-initialized handle per collaborator
///
/// Built once at startup and shared with request handlers; nothing is
/// loaded until a handler first asks for it.
#[derive(Debug)]
pub struct ServiceRegistry {
    pub translator: LazyService<dyn Translator>,
    pub summarizer: LazyService<dyn Summarizer>,
    pub sentiment: LazyService<dyn SentimentClassifier>,
    pub question_answerer: LazyService<dyn QuestionAnswerer>,
    pub similarity: LazyService<dyn SimilarityScorer>,
    pub generator: LazyService<dyn TextGenerator>,
    pub image_labeler: LazyService<dyn ImageLabeler>,
    pub entities: LazyService<dyn EntityExtractor>,
}

impl ServiceRegistry {
    /// Registry backed entirely by the offline mock services
    pub fn mock() -> Self {
        Self {
            translator: LazyService::new("translator", || {
                Ok(Arc::new(EchoTranslator::new("ar")) as Arc<dyn Translator>)
            }),
            summarizer: LazyService::new("summarizer", || {
                Ok(Arc::new(ExtractiveSummarizer::default()) as Arc<dyn Summarizer>)
            }),
            sentiment: LazyService::new("sentiment", || {
                Ok(Arc::new(LexiconSentiment) as Arc<dyn SentimentClassifier>)
            }),
            question_answerer: LazyService::new("question-answering", || {
                Ok(Arc::new(OverlapQuestionAnswerer) as Arc<dyn QuestionAnswerer>)
            }),
            similarity: LazyService::new("similarity", || {
                Ok(Arc::new(BagOfWordsSimilarity) as Arc<dyn SimilarityScorer>)
            }),
            generator: LazyService::new("text-generation", || {
                Ok(Arc::new(MockTextGenerator) as Arc<dyn TextGenerator>)
            }),
            image_labeler: LazyService::new("image-classification", || {
                Ok(Arc::new(BrightnessLabeler) as Arc<dyn ImageLabeler>)
            }),
            entities: LazyService::new("entities", || {
                Ok(Arc::new(CapitalizedEntities) as Arc<dyn EntityExtractor>)
            }),
        }
    }

    /// Builder: replace the translator
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = LazyService::ready("translator", translator);
        self
    }

    /// Builder: replace the image labeler
    pub fn with_image_labeler(mut self, labeler: Arc<dyn ImageLabeler>) -> Self {
        self.image_labeler = LazyService::ready("image-classification", labeler);
        self
    }

    /// Names of the handles initialized so far
    pub fn initialized(&self) -> Vec<&'static str> {
        [
            (self.translator.name(), self.translator.is_initialized()),
            (self.summarizer.name(), self.summarizer.is_initialized()),
            (self.sentiment.name(), self.sentiment.is_initialized()),
            (
                self.question_answerer.name(),
                self.question_answerer.is_initialized(),
            ),
            (self.similarity.name(), self.similarity.is_initialized()),
            (self.generator.name(), self.generator.is_initialized()),
            (self.image_labeler.name(), self.image_labeler.is_initialized()),
            (self.entities.name(), self.entities.is_initialized()),
        ]
        .into_iter()
        .filter(|(_, ready)| *ready)
        .map(|(name, _)| name)
        .collect()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::mock()
    }
}
