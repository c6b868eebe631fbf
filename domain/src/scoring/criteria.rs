//! Rubric criteria and their model prompts.
//!
//! Opportunity prompts attend to "Them:" speakers (the client); sales
//! coaching prompts attend to "Me:" speakers (the selling representative).
//! Declaration order is the fixed tie-break order used by aggregation.

/// System instruction shared by every scoring request
pub const SCORING_SYSTEM_INSTRUCTION: &str = "You are an expert at analyzing business meetings \
for hiring and organizational needs. Always respond with valid JSON.";

/// The five binary opportunity-qualification criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpportunityCriterion {
    Now,
    Next,
    Measure,
    Blocker,
    Fit,
}

impl OpportunityCriterion {
    pub const ALL: [OpportunityCriterion; 5] = [
        OpportunityCriterion::Now,
        OpportunityCriterion::Next,
        OpportunityCriterion::Measure,
        OpportunityCriterion::Blocker,
        OpportunityCriterion::Fit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OpportunityCriterion::Now => "Now",
            OpportunityCriterion::Next => "Next",
            OpportunityCriterion::Measure => "Measure",
            OpportunityCriterion::Blocker => "Blocker",
            OpportunityCriterion::Fit => "Fit",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            OpportunityCriterion::Now => NOW_PROMPT,
            OpportunityCriterion::Next => NEXT_PROMPT,
            OpportunityCriterion::Measure => MEASURE_PROMPT,
            OpportunityCriterion::Blocker => BLOCKER_PROMPT,
            OpportunityCriterion::Fit => FIT_PROMPT,
        }
    }
}

/// The eight 0-3 sales coaching criteria, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesCriterion {
    Introduction,
    Discovery,
    OpportunityScoping,
    SolutionPositioning,
    CommercialConfidence,
    CaseStudies,
    NextSteps,
    StrategicContext,
}

impl SalesCriterion {
    pub const ALL: [SalesCriterion; 8] = [
        SalesCriterion::Introduction,
        SalesCriterion::Discovery,
        SalesCriterion::OpportunityScoping,
        SalesCriterion::SolutionPositioning,
        SalesCriterion::CommercialConfidence,
        SalesCriterion::CaseStudies,
        SalesCriterion::NextSteps,
        SalesCriterion::StrategicContext,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SalesCriterion::Introduction => "Introduction & Framing",
            SalesCriterion::Discovery => "Discovery",
            SalesCriterion::OpportunityScoping => "Opportunity Scoping",
            SalesCriterion::SolutionPositioning => "Solution Positioning",
            SalesCriterion::CommercialConfidence => "Commercial Confidence",
            SalesCriterion::CaseStudies => "Case Studies",
            SalesCriterion::NextSteps => "Next Steps",
            SalesCriterion::StrategicContext => "Strategic Context",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            SalesCriterion::Introduction => SALES_INTRODUCTION_PROMPT,
            SalesCriterion::Discovery => SALES_DISCOVERY_PROMPT,
            SalesCriterion::OpportunityScoping => SALES_SCOPING_PROMPT,
            SalesCriterion::SolutionPositioning => SALES_SOLUTION_PROMPT,
            SalesCriterion::CommercialConfidence => SALES_COMMERCIAL_PROMPT,
            SalesCriterion::CaseStudies => SALES_CASE_STUDIES_PROMPT,
            SalesCriterion::NextSteps => SALES_NEXT_STEPS_PROMPT,
            SalesCriterion::StrategicContext => SALES_STRATEGIC_PROMPT,
        }
    }
}

const NOW_PROMPT: &str = r#"Analyze this meeting transcript for the CLIENT company's CURRENT STATE and IMMEDIATE talent needs.
ONLY analyze "Them:" speakers (the client). IGNORE all "Me:" speakers (the vendor representative).

What to look for:
1. Current company scale (revenue, headcount, team structure)
2. Immediate hiring needs, especially for roles that change where they're going
3. Need for a flexible talent model without compromising on quality
4. An internal talent team struggling to access the right people
5. Critical roles blocking growth or transformation

Return JSON with exactly these fields:
{
    "qualified": true or false,
    "reason": "short explanation for the decision",
    "summary": "1-3 sentences about the CLIENT's current talent situation",
    "evidence": "verbatim quote from 'Them:' speakers only, NEVER from 'Me:' speakers"
}"#;

const NEXT_PROMPT: &str = r#"Analyze this meeting transcript for the CLIENT company's FUTURE VISION and transformation needs.
ONLY analyze "Them:" speakers (the client). IGNORE all "Me:" speakers (the vendor representative).

What to look for:
1. A vision of becoming something new
2. A need to work ON the business model, not just IN the business
3. Plans for M&A, partnerships, or exits
4. A desire to build a talent strategy for long-term growth
5. Expansion plans requiring new operating models

Return JSON with exactly these fields:
{
    "qualified": true or false,
    "reason": "short explanation for the decision",
    "summary": "1-3 sentences about the CLIENT's transformation journey",
    "evidence": "verbatim quote from 'Them:' speakers only, NEVER from 'Me:' speakers"
}"#;

const MEASURE_PROMPT: &str = r#"Analyze how this CLIENT company measures SUCCESS.
ONLY analyze "Them:" speakers (the client). IGNORE all "Me:" speakers (the vendor representative).

What to look for:
1. Financial: revenue/ARR, margin %, topline targets
2. Adoption/NPS: usage, adoption, NPS/eNPS
3. Operational: time-to-hire, cycle time, churn, retention
4. Timeframes: any target dates

Return JSON with exactly these fields:
{
    "qualified": true or false,
    "reason": "short explanation for the decision",
    "summary": "1-3 sentences about the CLIENT (Them: speakers only)",
    "evidence": "verbatim quote from 'Them:' speakers only, NEVER from 'Me:' speakers"
}"#;

const BLOCKER_PROMPT: &str = r#"Identify the CLIENT company's biggest BLOCKERS preventing growth.
ONLY analyze "Them:" speakers (the client). IGNORE all "Me:" speakers (the vendor representative).

What to look for:
1. Access blockers: cannot reach the caliber of talent they need, internal
   recruiting lacks specialist support, talent compromises forced by flexibility needs
2. Transformation blockers: stuck working in the business, no clear blueprint
   from current state to future state, missing talent strategy
3. Partnership blockers: cannot value the business, fear of failed acquisitions,
   lacking the right introductions

Return JSON with exactly these fields:
{
    "qualified": true or false,
    "reason": "explain which blockers were identified",
    "summary": "1-3 sentences about the blockers raised",
    "evidence": "verbatim quote from 'Them:' speakers only, NEVER from 'Me:' speakers"
}"#;

const FIT_PROMPT: &str = r#"Classify this CLIENT company's needs against the vendor's product categories.
ONLY analyze "Them:" speakers (the client). IGNORE all "Me:" speakers (the vendor representative).

ACCESS: they need the right people to deliver (search, freelance bench, embedded partnership).
TRANSFORM: they need the right strategy to become more (workshops, org redesign, transformation support).
VENTURES: they need the right partnerships for step-change (M&A, valuation, exits).

Return STRICT JSON with exactly these fields:
{
    "qualified": true or false,
    "reason": "explain which product categories match their needs",
    "summary": "1-3 sentences mapping needs to product categories",
    "evidence": "verbatim quote <= 25 words from 'Them:' speakers only"
}"#;

const SALES_INTRODUCTION_PROMPT: &str = r#"Assess how well the selling representative introduced themselves and framed the meeting.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they introduce themselves and the company succinctly?
2. Did they frame the purpose of the meeting?
3. Did they set an agenda (discovery, solutions, next steps)?
4. Did they ask permission to ask probing questions?

Scoring guide:
- 0: No introduction or framing attempted
- 1: Basic intro but no agenda or framing
- 2: Good intro with some agenda setting
- 3: Strong intro with clear agenda, permission to probe, and meeting control

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve, or null if score is 3"
}"#;

const SALES_DISCOVERY_PROMPT: &str = r#"Assess how well the selling representative uncovered the client's problems and pain points.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they uncover high-level business challenges?
2. Did they identify specific talent or hiring challenges?
3. Did they explore the impact of those challenges?
4. Did they identify emotional drivers?
5. Did they ask what the client has tried before?

Scoring guide:
- 0: No meaningful discovery questions asked
- 1: Surface-level questions only
- 2: Good discovery with some depth
- 3: Excellent layered discovery uncovering business impact and emotional drivers

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve discovery, or null if score is 3"
}"#;

const SALES_SCOPING_PROMPT: &str = r#"Assess how well the selling representative scoped and qualified the opportunity.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they discuss budgets?
2. Did they ask about hiring volumes?
3. Did they understand the current hiring process?
4. Did they identify stakeholders?
5. Did they understand the buying process and timeline?

Scoring guide:
- 0: No scoping or qualification attempted
- 1: Basic scoping (1-2 elements)
- 2: Good scoping covering budget and timeline
- 3: Comprehensive scoping with budget, volumes, stakeholders, and process

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve scoping, or null if score is 3"
}"#;

const SALES_SOLUTION_PROMPT: &str = r#"Assess how well the selling representative positioned the solution.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they match client problems to specific products?
2. Did they talk business outcomes, not just features?
3. Did they position themselves as advisors rather than just recruiters?
4. Did they tailor positioning to the client's specific situation?

Scoring guide:
- 0: No solution positioning attempted
- 1: Generic pitch without matching to client needs
- 2: Good positioning with some product matching
- 3: Strong positioning with clear problem-to-product mapping and outcome focus

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve positioning, or null if score is 3"
}"#;

const SALES_COMMERCIAL_PROMPT: &str = r#"Assess how confidently the selling representative discussed commercials and fees.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they mention fees or commercial terms without apologizing?
2. Did they explain the value behind the fees?
3. Did they discuss payment structure?
4. Did they check budget alignment before promising a proposal?

Scoring guide:
- 0: No commercial discussion or avoided the topic
- 1: Mentioned fees but apologetically or vaguely
- 2: Clear fee discussion with some value articulation
- 3: Confident commercial discussion with value justification and budget alignment

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve commercial confidence, or null if score is 3"
}"#;

const SALES_CASE_STUDIES_PROMPT: &str = r#"Assess whether the selling representative shared relevant case studies or proof points.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they share specific case studies or client examples?
2. Were the examples relevant to the client's situation?
3. Did they include specific outcomes or results?
4. Did they use stories to build credibility?

Scoring guide:
- 0: No case studies or proof points shared
- 1: Generic or irrelevant examples mentioned
- 2: Relevant case study but limited detail
- 3: Strong, relevant case studies with specific outcomes matched to client needs

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve use of proof points, or null if score is 3"
}"#;

const SALES_NEXT_STEPS_PROMPT: &str = r#"Assess how well the selling representative closed the meeting and agreed next steps.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they summarize what they heard?
2. Did they agree a specific next step with a date or time?
3. Did they identify decision-makers and influencers?
4. Did they confirm the buying process?
5. Did they create momentum rather than leaving things open-ended?

Scoring guide:
- 0: No clear next steps agreed
- 1: Vague next steps without dates or owners
- 2: Clear next step but limited stakeholder mapping
- 3: Strong close with clear next step, stakeholder map, and momentum created

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve closing, or null if score is 3"
}"#;

const SALES_STRATEGIC_PROMPT: &str = r#"Assess how well the selling representative gathered strategic context about the client's business.
ONLY analyze "Me:" speakers (the rep). IGNORE all "Them:" speakers (the client).

What to look for:
1. Did they ask where the business is going?
2. Did they understand org design challenges or market conditions?
3. Did they identify talent bottlenecks blocking growth?
4. Did they ask what success looks like in 12 months?
5. Did they spot cross-sell opportunities naturally?

Scoring guide:
- 0: No strategic context gathered
- 1: Basic understanding of current state only
- 2: Good understanding of direction but limited depth
- 3: Comprehensive strategic picture with future vision and cross-sell awareness

Return JSON with exactly these fields:
{
    "qualified": true if score >= 2,
    "score": 0-3 integer,
    "reason": "short explanation for the score",
    "evidence": "verbatim quote from 'Me:' speakers, or null",
    "coaching_note": "specific suggestion to improve strategic questioning, or null if score is 3"
}"#;
