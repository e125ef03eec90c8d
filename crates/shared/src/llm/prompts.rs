/// System instruction for the topic gate. The model must answer with a bare
/// `yes` or `no`; anything else counts as a rejection.
pub const PET_TOPIC_CLASSIFIER_PROMPT: &str = "You are a classifier that answers only with 'yes' or 'no'. \
Respond 'yes' only if the message is about pets: mammals, birds, fish or reptiles kept as companions \
(for example dogs, cats, parrots, goldfish, rabbits or turtles), including their care, health, feeding, \
training and behaviour. Wild or protected species that are not kept as companions do not count. \
For anything else respond 'no'.";

pub const CLASSIFIER_ADMIT_TOKEN: &str = "yes";

pub const CLASSIFIER_TEMPERATURE: f32 = 0.0;
