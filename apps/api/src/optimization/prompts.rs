// All LLM prompt templates for the optimization stages.
// Rendered with optimization::template::render. Placeholders in {braces}.

/// Stage 1: E-E-A-T assessment.
/// Placeholders: {brand_name}, {site_url}, {tone_of_voice}, {about_us}, {content}
pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Assess the following content against Google's E-E-A-T criteria for the brand "{brand_name}".

CONTENT TO ASSESS:
{content}

BRAND INFORMATION:
- Name: {brand_name}
- URL: {site_url}
- Tone of voice: {tone_of_voice}
- About us: {about_us}

Score the content from 1 to 10 on each of these four E-E-A-T criteria:

1. EXPERIENCE:
- Practical, varied examples
- Real-world applicability
- Specific, contextualised details
- Case studies or first-hand experience

2. EXPERTISE:
- Evidence of in-depth knowledge
- Technical accuracy of the information
- Original insight or proprietary research
- Appropriate use of specialist terminology

3. AUTHORITATIVENESS:
- Citations of reliable sources
- References to studies and research
- Links to authoritative resources
- Industry recognition

4. TRUSTWORTHINESS:
- Transparency of information
- Objectivity of viewpoint
- Disclosure of limitations or conflicts of interest
- Supporting data and evidence

Answer in exactly this format:

## E-E-A-T SCORES (1 to 10)
- Experience: [score]/10
- Expertise: [score]/10
- Authoritativeness: [score]/10
- Trustworthiness: [score]/10
- **TOTAL SCORE: [sum]/40**

## DETAILED ANALYSIS

### Experience
[Detailed analysis of Experience with specific examples from the content]

### Expertise
[Detailed analysis of Expertise with specific examples from the content]

### Authoritativeness
[Detailed analysis of Authoritativeness with specific examples from the content]

### Trustworthiness
[Detailed analysis of Trustworthiness with specific examples from the content]

## STRENGTHS
[List of the strengths identified]

## AREAS FOR IMPROVEMENT
[List of the areas that need improvement]"#;

/// Stage 2: optimization suggestions.
/// Placeholders: {brand_name}, {site_url}, {tone_of_voice}, {content}, {assessment},
///               {competitor_context}, {internal_urls}, {tone_instruction}
pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"Based on the previous E-E-A-T assessment, produce specific suggestions to optimise the content.

CURRENT CONTENT:
{content}

BRAND INFO:
- Name: {brand_name}
- URL: {site_url}
- Tone of voice: {tone_of_voice}

PREVIOUS E-E-A-T ASSESSMENT:
{assessment}

COMPETITOR ANALYSIS:
{competitor_context}

AVAILABLE INTERNAL URLS (first 20):
{internal_urls}

Structure your suggestions in exactly this format:

## E-E-A-T OPTIMISATION STRATEGY

### 1. EXPERIENCE IMPROVEMENTS
- [Specific suggestion 1 with a practical example]
- [Specific suggestion 2 with a practical example]
- [Specific suggestion 3 with a practical example]

### 2. EXPERTISE IMPROVEMENTS
- [Specific suggestion 1 to demonstrate expertise]
- [Specific suggestion 2 to demonstrate expertise]
- [Specific suggestion 3 to demonstrate expertise]

### 3. AUTHORITATIVENESS IMPROVEMENTS
- [Specific suggestion 1 to increase authority]
- [Specific suggestion 2 to increase authority]
- [Specific suggestion 3 to increase authority]

### 4. TRUSTWORTHINESS IMPROVEMENTS
- [Specific suggestion 1 to increase trust]
- [Specific suggestion 2 to increase trust]
- [Specific suggestion 3 to increase trust]

## RECOMMENDED INTERNAL LINKS
[Pick 5-8 internal URLs from the sitemap list that are relevant to this content]

## OPTIMISED CONTENT STRUCTURE
[Propose an improved structure with H2, H3, etc.]

## ADDITIONAL CONTENT TO INCLUDE
[Suggest paragraphs, sections or specific elements to add]

## CALLS TO ACTION AND CONVERSIONS
[Suggest calls to action suited to this content]

{tone_instruction}"#;

/// Stage 3: final rewrite.
/// Placeholders: {brand_name}, {site_url}, {tone_of_voice}, {about_us}, {content},
///               {assessment}, {suggestions}, {competitor_context}, {internal_urls},
///               {heading_instruction}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"Now write the FINAL, OPTIMISED version of the content, ready to publish.
Apply ALL of the E-E-A-T optimisation suggestions to produce content of superior quality.

ORIGINAL CONTENT:
{content}

BRAND INFO:
- Name: {brand_name}
- URL: {site_url}
- Tone of voice: {tone_of_voice}
- About us: {about_us}

E-E-A-T ASSESSMENT:
{assessment}

OPTIMISATION SUGGESTIONS:
{suggestions}

COMPETITOR INSIGHTS:
{competitor_context}

AVAILABLE INTERNAL URLS:
{internal_urls}

INSTRUCTIONS FOR THE OPTIMISED CONTENT:

1. **EXPERIENCE**: weave in concrete examples, case studies, specific data and hands-on experience
2. **EXPERTISE**: show technical competence, use the right terminology, include original insight
3. **AUTHORITATIVENESS**: cite authoritative sources, reference studies, link to credible resources
4. **TRUSTWORTHINESS**: stay transparent and objective, add disclaimers where needed

STRUCTURE THE CONTENT WITH:
- An SEO-optimised main title
- An engaging introduction
- Well-organised H2 and H3 subheadings
- Paragraphs with practical examples and data
- Authoritative citations and references
- Relevant internal links woven in naturally
- Effective calls to action
- A conclusion that summarises and invites action

KEEP:
- Tone of voice: {tone_of_voice}
- Length: 1500-2000 words minimum
- Markdown formatting for the web
- SEO-friendly but natural wording
- {heading_instruction}

The content must be:
- Ready to publish
- Optimised for E-E-A-T
- SEO-friendly
- Engaging for the reader
- Aligned with the brand
- Using correctly formatted headings (first letter capitalised only)

WRITE THE COMPLETE OPTIMISED CONTENT:"#;
